//! Tests for CLI > environment > TOML > default precedence.

use std::time::Duration;

use super::*;

const FULL_TOML: &str = r#"
    [account]
    phone_number_id = "toml-phone"
    access_token = "toml-token"
    business_account_id = "toml-waba"

    [api]
    version = "v19.0"
    base_url = "http://toml.example.com"

    [http]
    timeout = 11
    max_retries = 1
    verify_ssl = true
    pool_size = 11
    rate_limit = 11

    [logging]
    debug = false
"#;

mod cli_precedence {
    use super::*;

    #[test]
    fn cli_overrides_env_and_toml() {
        let cli = cli(&[
            "--phone-number-id",
            "cli-phone",
            "--business-account-id",
            "cli-waba",
            "--api-version",
            "v21.0",
            "--base-url",
            "http://cli.example.com",
            "--timeout",
            "33",
            "--max-retries",
            "3",
            "--pool-size",
            "33",
            "--rate-limit",
            "33",
        ]);
        let env = env(&[
            (env::PHONE_NUMBER_ID, "env-phone"),
            (env::BUSINESS_ACCOUNT_ID, "env-waba"),
            (env::API_VERSION, "v20.0"),
            (env::BASE_URL, "http://env.example.com"),
            (env::TIMEOUT, "22"),
            (env::MAX_RETRIES, "2"),
            (env::POOL_SIZE, "22"),
            (env::RATE_LIMIT, "22"),
        ]);

        let config = ValidatedConfig::from_raw(&cli, &env, Some(&toml(FULL_TOML))).unwrap();

        assert_eq!(config.credentials.phone_number_id(), "cli-phone");
        assert_eq!(config.credentials.business_account_id(), Some("cli-waba"));
        assert_eq!(config.transport.api_version, "v21.0");
        assert_eq!(config.transport.base_url.as_str(), "http://cli.example.com/");
        assert_eq!(config.transport.timeout, Duration::from_secs(33));
        assert_eq!(config.transport.max_retries, 3);
        assert_eq!(config.transport.pool_size, 33);
        assert_eq!(config.transport.rate_limit, 33);
    }

    #[test]
    fn insecure_flag_disables_verification() {
        let cli = cli(&["--insecure"]);
        let env = env(&[
            (env::PHONE_NUMBER_ID, "1"),
            (env::ACCESS_TOKEN, "t"),
            (env::VERIFY_SSL, "true"),
        ]);

        let config = ValidatedConfig::from_raw(&cli, &env, None).unwrap();

        assert!(!config.transport.verify_tls);
    }

    #[test]
    fn verbose_enables_debug_over_env() {
        let env = env(&[
            (env::PHONE_NUMBER_ID, "1"),
            (env::ACCESS_TOKEN, "t"),
            (env::DEBUG, "false"),
        ]);

        let config = ValidatedConfig::from_raw(&cli(&["--verbose"]), &env, None).unwrap();

        assert!(config.debug);
    }
}

mod env_precedence {
    use super::*;

    #[test]
    fn env_overrides_toml() {
        let env = env(&[
            (env::PHONE_NUMBER_ID, "env-phone"),
            (env::ACCESS_TOKEN, "env-token"),
            (env::API_VERSION, "v20.0"),
            (env::TIMEOUT, "22"),
            (env::VERIFY_SSL, "false"),
            (env::DEBUG, "1"),
            (env::RATE_LIMIT, "22"),
        ]);

        let config = ValidatedConfig::from_raw(&cli(&[]), &env, Some(&toml(FULL_TOML))).unwrap();

        assert_eq!(config.credentials.phone_number_id(), "env-phone");
        assert_eq!(config.credentials.access_token().expose_secret(), "env-token");
        assert_eq!(config.transport.api_version, "v20.0");
        assert_eq!(config.transport.timeout, Duration::from_secs(22));
        assert!(!config.transport.verify_tls);
        assert!(config.debug);
        assert_eq!(config.transport.rate_limit, 22);
        // unset in env, so TOML wins
        assert_eq!(config.transport.pool_size, 11);
        assert_eq!(config.credentials.business_account_id(), Some("toml-waba"));
    }
}

mod toml_precedence {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), &env(&[]), Some(&toml(FULL_TOML))).unwrap();

        assert_eq!(config.credentials.phone_number_id(), "toml-phone");
        assert_eq!(config.transport.api_version, "v19.0");
        assert_eq!(config.transport.base_url.as_str(), "http://toml.example.com/");
        assert_eq!(config.transport.timeout, Duration::from_secs(11));
        assert_eq!(config.transport.max_retries, 1);
        assert_eq!(config.transport.pool_size, 11);
        assert_eq!(config.transport.rate_limit, 11);
    }
}
