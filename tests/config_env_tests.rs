//! Integration tests for ClientConfig::from_env()

use kafkaesque_admin::config::ClientConfig;
use kafkaesque_admin::constants::{DEFAULT_CLIENT_ID, DEFAULT_REQUEST_TIMEOUT};
use kafkaesque_admin::error::Error;
use kafkaesque_admin::protocol::ApiKey;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

/// Global mutex to serialize all env-based tests.
/// Environment variables are process-global, so we must prevent concurrent access.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// All environment variables read by ClientConfig::from_env().
const ALL_CONFIG_ENV_VARS: &[&str] = &[
    "KAFKA_CLIENT_ID",
    "KAFKA_REQUEST_TIMEOUT_MS",
    "KAFKA_MAX_VERSION_DESCRIBE_ACLS",
    "KAFKA_MAX_VERSION_CREATE_ACLS",
    "KAFKA_MAX_VERSION_DELETE_ACLS",
];

/// Run `f` with exactly `vars` set among the config variables, restoring
/// the previous values afterwards.
fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let all_originals: Vec<_> = ALL_CONFIG_ENV_VARS
        .iter()
        .map(|k| (*k, env::var(*k).ok()))
        .collect();

    for key in ALL_CONFIG_ENV_VARS {
        unsafe { env::remove_var(key) };
    }

    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    for (key, original) in all_originals {
        match original {
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
    }

    result
}

#[test]
fn test_from_env_defaults() {
    with_env_vars(&[], || {
        let config = ClientConfig::from_env().expect("Should parse config");
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.max_versions.is_empty());
    });
}

#[test]
fn test_from_env_with_client_id_and_timeout() {
    with_env_vars(
        &[
            ("KAFKA_CLIENT_ID", "acl-sync"),
            ("KAFKA_REQUEST_TIMEOUT_MS", "1500"),
        ],
        || {
            let config = ClientConfig::from_env().expect("Should parse config");
            assert_eq!(config.client_id, "acl-sync");
            assert_eq!(config.request_timeout, Duration::from_millis(1500));
        },
    );
}

#[test]
fn test_from_env_with_version_caps() {
    with_env_vars(
        &[
            ("KAFKA_MAX_VERSION_DESCRIBE_ACLS", "1"),
            ("KAFKA_MAX_VERSION_DELETE_ACLS", "2"),
        ],
        || {
            let config = ClientConfig::from_env().expect("Should parse config");
            assert_eq!(config.max_version(ApiKey::DescribeAcls), Some(1));
            assert_eq!(config.max_version(ApiKey::DeleteAcls), Some(2));
            assert_eq!(config.max_version(ApiKey::CreateAcls), None);
        },
    );
}

#[test]
fn test_from_env_invalid_timeout() {
    with_env_vars(&[("KAFKA_REQUEST_TIMEOUT_MS", "soon")], || {
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("KAFKA_REQUEST_TIMEOUT_MS")));
    });
}

#[test]
fn test_from_env_zero_timeout_fails_validation() {
    with_env_vars(&[("KAFKA_REQUEST_TIMEOUT_MS", "0")], || {
        assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));
    });
}

#[test]
fn test_from_env_invalid_version_cap() {
    with_env_vars(&[("KAFKA_MAX_VERSION_CREATE_ACLS", "three")], || {
        let err = ClientConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("KAFKA_MAX_VERSION_CREATE_ACLS"));
    });
}

#[test]
fn test_from_env_empty_client_id() {
    with_env_vars(&[("KAFKA_CLIENT_ID", "")], || {
        assert!(ClientConfig::from_env().is_err());
    });
}
