//! Tests for the run module.

use super::*;

use std::sync::Mutex;

use http::{HeaderMap, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use whatsapp_cloud::Credentials;
use whatsapp_cloud::transport::{HttpError, HttpRequest, HttpResponse, TransportSettings};

/// Answers calls from a fixed queue and records what was sent.
#[derive(Debug, Default)]
struct StubClient {
    responses: Mutex<Vec<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubClient {
    fn replying(status: u16, body: &Value) -> Self {
        let response = HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_string().into_bytes(),
        );
        Self {
            responses: Mutex::new(vec![response]),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_url(&self) -> String {
        self.requests.lock().unwrap().last().unwrap().url.to_string()
    }
}

impl HttpClient for StubClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        Ok(self.responses.lock().unwrap().remove(0))
    }
}

fn client(stub: StubClient) -> WhatsAppClient<StubClient> {
    let credentials = Credentials::new("111", SecretString::new("token".to_string()))
        .with_business_account_id("waba-1");
    let settings = TransportSettings {
        rate_limit: 1000,
        ..TransportSettings::default()
    };
    WhatsAppClient::with_http_client(credentials, &settings, stub).unwrap()
}

fn verifier() -> WebhookVerifier {
    WebhookVerifier::new(
        Some(SecretString::new("app-secret".to_string())),
        Some(SecretString::new("hook-token".to_string())),
    )
}

mod run_error {
    use super::*;

    #[test]
    fn signature_mismatch_displays_message() {
        assert_eq!(
            RunError::SignatureMismatch.to_string(),
            "Signature does not match payload"
        );
    }

    #[test]
    fn client_error_is_transparent() {
        let error = RunError::from(Error::validation("to", "must not be empty"));
        assert!(error.to_string().contains("to"));
        assert!(matches!(error, RunError::Client(_)));
    }

    #[test]
    fn not_acknowledged_names_the_command() {
        let error = RunError::NotAcknowledged("delete-media");
        assert_eq!(error.to_string(), "delete-media was not acknowledged by the API");
    }
}

mod api_commands {
    use super::*;

    #[tokio::test]
    async fn send_text_prints_message_id() {
        let client = client(StubClient::replying(
            200,
            &json!({"messaging_product": "whatsapp", "messages": [{"id": "wamid.42"}]}),
        ));

        let output = dispatch(
            &client,
            Command::SendText {
                to: "+1 555 010 0123".to_string(),
                body: "hi".to_string(),
                preview_url: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(output, "wamid.42");
        assert_eq!(
            client.transport().client().last_url(),
            "https://graph.facebook.com/v23.0/111/messages"
        );
    }

    #[tokio::test]
    async fn unacknowledged_delete_is_an_error() {
        let client = client(StubClient::replying(200, &json!({"success": false})));

        let result = dispatch(
            &client,
            Command::DeleteMedia {
                media_id: "m-1".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(RunError::NotAcknowledged("delete-media"))));
    }

    #[tokio::test]
    async fn list_templates_renders_one_line_each() {
        let client = client(StubClient::replying(
            200,
            &json!({"data": [
                {"id": "1", "name": "welcome", "language": "en_US", "status": "APPROVED", "category": "UTILITY"},
                {"id": "2", "name": "promo", "language": "es", "status": "REJECTED"}
            ]}),
        ));

        let output = dispatch(&client, Command::ListTemplates).await.unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, ["welcome\ten_US\tApproved\tUtility", "promo\tes\tRejected\t-"]);
        assert_eq!(
            client.transport().client().last_url(),
            "https://graph.facebook.com/v23.0/waba-1/message_templates"
        );
    }

    #[tokio::test]
    async fn api_error_propagates() {
        let client = client(StubClient::replying(
            400,
            &json!({"error": {"message": "Bad param", "code": 100}}),
        ));

        let result = dispatch(
            &client,
            Command::MediaUrl {
                media_id: "m-1".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(RunError::Client(Error::Api(_)))));
    }

    #[tokio::test]
    async fn init_is_not_dispatched() {
        let client = client(StubClient::default());

        let result = dispatch(
            &client,
            Command::Init {
                output: PathBuf::from("wa-cloud.toml"),
            },
        )
        .await;

        assert!(matches!(result, Err(RunError::Unsupported("init"))));
    }
}

mod webhook_commands {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use whatsapp_cloud::webhook::sign_payload;

    fn payload_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = r#"{"object":"whatsapp_business_account","entry":[]}"#;
        let file = payload_file(body);
        let signature =
            sign_payload(&SecretString::new("app-secret".to_string()), body.as_bytes()).unwrap();

        let output = run_offline(
            &verifier(),
            &Command::VerifySignature {
                signature,
                payload: file.path().to_path_buf(),
            },
        )
        .unwrap();

        assert_eq!(output, "Signature valid");
    }

    #[test]
    fn wrong_signature_is_a_mismatch() {
        let file = payload_file("{}");

        let result = run_offline(
            &verifier(),
            &Command::VerifySignature {
                signature: format!("sha256={}", "0".repeat(64)),
                payload: file.path().to_path_buf(),
            },
        );

        assert!(matches!(result, Err(RunError::SignatureMismatch)));
    }

    #[test]
    fn missing_payload_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();

        let result = run_offline(
            &verifier(),
            &Command::VerifySignature {
                signature: "sha256=00".to_string(),
                payload: dir.path().join("absent.json"),
            },
        );

        assert!(matches!(result, Err(RunError::ReadPayload { .. })));
    }

    #[test]
    fn verify_token_checks_configured_value() {
        let ok = run_offline(
            &verifier(),
            &Command::VerifyToken {
                token: "hook-token".to_string(),
            },
        );
        assert!(ok.is_ok());

        let bad = run_offline(
            &verifier(),
            &Command::VerifyToken {
                token: "other".to_string(),
            },
        );
        assert!(matches!(bad, Err(RunError::TokenMismatch)));
    }

    #[test]
    fn parse_webhook_prints_flattened_event() {
        let file = payload_file(
            r#"{"object":"whatsapp_business_account","entry":[{"id":"waba","changes":[
                {"field":"messages","value":{"messaging_product":"whatsapp",
                 "messages":[{"from":"15550100123","id":"wamid.1","timestamp":"1700000000",
                              "type":"text","text":{"body":"hello"}}]}}]}]}"#,
        );

        let output = run_offline(
            &WebhookVerifier::default(),
            &Command::ParseWebhook {
                payload: file.path().to_path_buf(),
            },
        )
        .unwrap();

        let event: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(event["messages"][0]["id"], "wamid.1");
        assert_eq!(event["statuses"], json!([]));
    }

    #[test]
    fn api_commands_need_credentials() {
        let result = run_offline(&verifier(), &Command::ListTemplates);
        assert!(matches!(result, Err(RunError::Unsupported(_))));
    }
}
