//! Tests for template models and the management service.

use std::sync::Arc;

use http::Method;
use serde_json::json;

use super::*;
use crate::error::{Error, ErrorKind};
use crate::messages::MediaSource;
use crate::test_support::{MockClient, RecordingSleeper, fast_settings, sent_json, token};
use crate::transport::Transport;

fn transport(mock: &Arc<MockClient>) -> Transport<Arc<MockClient>, RecordingSleeper> {
    Transport::new(Arc::clone(mock), &fast_settings(), &token())
        .unwrap()
        .with_sleeper(RecordingSleeper::default())
}

mod reference {
    use super::*;

    #[test]
    fn name_is_trimmed_and_lowercased() {
        let template = Template::new("  Order_Shipped ", " en_US ").unwrap();

        assert_eq!(template.name, "order_shipped");
        assert_eq!(template.language.code, "en_US");
        assert!(template.components.is_empty());
    }

    #[test]
    fn blank_or_long_names_are_rejected() {
        let err = Template::new("  ", "en").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "template.name", .. }));

        let long = "a".repeat(MAX_TEMPLATE_NAME_CHARS + 1);
        assert!(Template::new(&long, "en").is_err());
        assert!(Template::new(&"a".repeat(MAX_TEMPLATE_NAME_CHARS), "en").is_ok());
    }

    #[test]
    fn blank_language_is_rejected() {
        let err = Template::new("welcome", "").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "template.language", .. }));
    }

    #[test]
    fn oversized_text_parameter_fails_validation() {
        let template = Template::new("welcome", "en").unwrap().with_component(
            TemplateComponent::body(vec![TemplateParameter::text(
                "x".repeat(MAX_TEXT_PARAMETER_CHARS + 1),
            )]),
        );

        let err = template.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                field: "template.parameters.text",
                ..
            }
        ));
    }

    #[test]
    fn parameter_variants_serialize_with_type_tag() {
        let template = Template::new("receipt", "en")
            .unwrap()
            .with_component(TemplateComponent::header(vec![TemplateParameter::image(
                MediaSource::Link("https://example.com/logo.png".to_string()),
            )]))
            .with_component(TemplateComponent::body(vec![
                TemplateParameter::Currency {
                    currency: Currency {
                        fallback_value: "$10.99".to_string(),
                        code: "USD".to_string(),
                        amount_1000: 10_990,
                    },
                },
                TemplateParameter::DateTime {
                    date_time: DateTime {
                        fallback_value: "March 3".to_string(),
                    },
                },
            ]))
            .with_component(TemplateComponent::button(
                "quick_reply",
                0,
                vec![TemplateParameter::Payload {
                    payload: "STOP".to_string(),
                }],
            ));

        assert_eq!(
            serde_json::to_value(&template).unwrap()["components"],
            json!([
                {
                    "type": "header",
                    "parameters": [
                        {"type": "image", "image": {"link": "https://example.com/logo.png"}}
                    ]
                },
                {
                    "type": "body",
                    "parameters": [
                        {
                            "type": "currency",
                            "currency": {"fallback_value": "$10.99", "code": "USD", "amount_1000": 10990}
                        },
                        {"type": "date_time", "date_time": {"fallback_value": "March 3"}}
                    ]
                },
                {
                    "type": "button",
                    "sub_type": "quick_reply",
                    "index": 0,
                    "parameters": [{"type": "payload", "payload": "STOP"}]
                }
            ])
        );
    }
}

mod definition {
    use super::*;

    #[test]
    fn request_serializes_uppercase_category() {
        let request = TemplateRequest::new(
            "Order_Update",
            TemplateCategory::Utility,
            "en_US",
            vec![ComponentDefinition::body("Your order {{1}} shipped")],
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "order_update",
                "category": "UTILITY",
                "language": "en_US",
                "components": [{"type": "BODY", "text": "Your order {{1}} shipped"}]
            })
        );
    }

    #[test]
    fn name_must_be_letters_digits_underscores() {
        let err = TemplateRequest::new("order-update", TemplateCategory::Marketing, "en", Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "template.name", .. }));

        assert!(
            TemplateRequest::new("order update", TemplateCategory::Marketing, "en", Vec::new())
                .is_err()
        );
        assert!(
            TemplateRequest::new("order_update_2", TemplateCategory::Marketing, "en", Vec::new())
                .is_ok()
        );
    }

    #[test]
    fn info_parses_status_and_unknown_values() {
        let info: TemplateInfo = serde_json::from_value(json!({
            "id": "1",
            "name": "hello_world",
            "status": "IN_APPEAL",
            "category": "MARKETING",
            "language": "en_US"
        }))
        .unwrap();
        assert_eq!(info.status, TemplateStatus::InAppeal);
        assert_eq!(info.category, Some(TemplateCategory::Marketing));
        assert!(!info.is_approved());

        let info: TemplateInfo = serde_json::from_value(json!({
            "id": "2",
            "status": "SOMETHING_NEW",
            "category": "OTHER"
        }))
        .unwrap();
        assert_eq!(info.status, TemplateStatus::Unknown);
        assert_eq!(info.category, Some(TemplateCategory::Unknown));
    }
}

mod service {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn list_reads_data_array() {
        let mock = MockClient::json(
            200,
            &json!({
                "data": [
                    {"id": "1", "name": "hello_world", "status": "APPROVED", "language": "en_US"},
                    {"id": "2", "name": "promo", "status": "REJECTED", "rejected_reason": "PROMOTIONAL"}
                ],
                "paging": {"cursors": {"before": "a", "after": "b"}}
            }),
        );
        let transport = transport(&mock);

        let templates = Templates::new(&transport, "waba-1", "123").list().await.unwrap();

        assert_eq!(templates.len(), 2);
        assert!(templates[0].is_approved());
        assert_eq!(templates[1].rejected_reason.as_deref(), Some("PROMOTIONAL"));

        let request = mock.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            "https://graph.facebook.com/v23.0/waba-1/message_templates"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn create_posts_definition() {
        let mock = MockClient::json(
            200,
            &json!({"id": "tpl-9", "status": "PENDING", "category": "UTILITY"}),
        );
        let transport = transport(&mock);
        let request = TemplateRequest::new(
            "shipping",
            TemplateCategory::Utility,
            "en",
            vec![ComponentDefinition::body("Shipped")],
        )
        .unwrap();

        let created = Templates::new(&transport, "waba-1", "123")
            .create(&request)
            .await
            .unwrap();

        assert_eq!(created.id, "tpl-9");
        assert_eq!(created.status.as_deref(), Some("PENDING"));
        assert_eq!(mock.last_request().method, Method::POST);
        assert_eq!(sent_json(&mock)["name"], "shipping");
    }

    #[tokio::test(start_paused = true)]
    async fn delete_passes_name_as_query() {
        let mock = MockClient::json(200, &json!({"success": true}));
        let transport = transport(&mock);

        let deleted = Templates::new(&transport, "waba-1", "123")
            .delete("old_promo")
            .await
            .unwrap();

        assert!(deleted);
        let request = mock.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url.query(), Some("name=old_promo"));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_blank_name_is_rejected_locally() {
        let mock = MockClient::new(Vec::new());
        let transport = transport(&mock);

        let err = Templates::new(&transport, "waba-1", "123")
            .delete(" ")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn send_goes_through_phone_number_messages() {
        let mock = MockClient::json(200, &json!({"messages": [{"id": "wamid.T"}]}));
        let transport = transport(&mock);

        let response = Templates::new(&transport, "waba-1", "123")
            .send("15550100123", Template::new("hello_world", "en_US").unwrap())
            .await
            .unwrap();

        assert_eq!(response.message_id(), Some("wamid.T"));
        assert_eq!(
            mock.last_request().url.as_str(),
            "https://graph.facebook.com/v23.0/123/messages"
        );
        assert_eq!(sent_json(&mock)["type"], "template");
    }
}
