//! Tests for `ReqwestClient`.
//!
//! These cover construction from settings. Request behavior against a
//! live server is exercised through the `HttpClient` mock in
//! `executor_tests` instead.

use std::time::Duration;

use super::*;

mod reqwest_client {
    use super::*;

    #[test]
    fn from_settings_builds_client() {
        let client = ReqwestClient::from_settings(&TransportSettings::default()).unwrap();

        assert!(format!("{client:?}").contains("ReqwestClient"));
    }

    #[test]
    fn connection_cap_is_twice_pool_size() {
        let settings = TransportSettings {
            pool_size: 4,
            ..TransportSettings::default()
        };
        let client = ReqwestClient::from_settings(&settings).unwrap();

        assert_eq!(client.available_connections(), 8);
    }

    #[test]
    fn insecure_settings_still_build() {
        let settings = TransportSettings {
            verify_tls: false,
            timeout: Duration::from_secs(5),
            ..TransportSettings::default()
        };

        assert!(ReqwestClient::from_settings(&settings).is_ok());
    }

    #[test]
    fn from_client_never_allows_zero_connections() {
        let client = ReqwestClient::from_client(reqwest::Client::new(), 0);

        assert_eq!(client.available_connections(), 1);
    }

    #[test]
    fn clones_share_connection_cap() {
        let client = ReqwestClient::from_client(reqwest::Client::new(), 3);
        let clone = client.clone();

        assert_eq!(
            client.available_connections(),
            clone.available_connections()
        );
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestClient>();
    }

    #[tokio::test]
    async fn request_to_invalid_host_returns_error_or_proxy_response() {
        let client = ReqwestClient::from_client(reqwest::Client::new(), 1);
        let url = url::Url::parse("http://invalid.invalid.invalid/").unwrap();

        let result = client.request(HttpRequest::get(url)).await;

        // A proxy in the test environment may answer with an error status
        // instead of failing the connection.
        match result {
            Err(HttpError::Connection(_)) => {}
            Ok(resp) if !resp.is_success() => {}
            other => panic!("Expected connection error or proxy error response, got {other:?}"),
        }
        assert_eq!(client.available_connections(), 1);
    }
}
