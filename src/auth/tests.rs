//! Tests for the auth module

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_docker_config_parsing() {
    let config_json = r#"{
        "auths": {
            "docker.io": {
                "auth": "dXNlcjpwYXNz"
            },
            "ghcr.io": {
                "username": "octocat",
                "password": "ghp_token"
            }
        },
        "credHelpers": {
            "123456789.dkr.ecr.us-east-1.amazonaws.com": "ecr-login"
        },
        "credsStore": "desktop"
    }"#;

    let config: DockerConfig = serde_json::from_str(config_json).unwrap();

    assert_eq!(config.auths.len(), 2);
    assert_eq!(config.auths["docker.io"].auth.as_deref(), Some("dXNlcjpwYXNz"));
    assert_eq!(config.auths["ghcr.io"].username.as_deref(), Some("octocat"));
    assert_eq!(config.cred_helpers.len(), 1);
    assert_eq!(config.creds_store.as_deref(), Some("desktop"));
}

#[test]
fn test_auth_blob_decodes_to_basic() {
    let auth = AuthConfig {
        auth: Some("dXNlcjpwYXNz".to_string()),
        ..Default::default()
    };
    match auth.to_registry_auth() {
        RegistryAuth::Basic(user, pass) => {
            assert_eq!(user, "user");
            assert_eq!(pass, "pass");
        }
        _ => panic!("expected basic auth"),
    }
}

#[test]
fn test_invalid_auth_blob_is_anonymous() {
    let auth = AuthConfig {
        auth: Some("not base64!".to_string()),
        ..Default::default()
    };
    assert!(matches!(auth.to_registry_auth(), RegistryAuth::Anonymous));
    assert!(AuthConfig::default().is_anonymous());
}

#[test]
fn test_static_keychain_matches_host_spellings() {
    let mut credentials = HashMap::new();
    credentials.insert(
        "registry-1.docker.io".to_string(),
        AuthConfig::new("user".to_string(), "secret".to_string()),
    );
    let keychain = StaticKeychain::new(credentials);

    let found = keychain.resolve("docker.io").unwrap();
    assert_eq!(found.and_then(|a| a.username).as_deref(), Some("user"));
    assert!(keychain.resolve("quay.io").unwrap().is_none());
    assert!(matches!(
        keychain.registry_auth("quay.io").unwrap(),
        RegistryAuth::Anonymous
    ));
}

#[test]
fn test_docker_config_keychain_reads_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"auths": {"https://quay.io": {"username": "robot", "password": "pw"}}}"#,
    )
    .unwrap();

    let keychain = DockerConfigKeychain::with_paths(vec![dir.path().join("missing.json"), path]);
    let found = keychain.resolve("quay.io").unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("robot"));
    assert!(keychain.resolve("ghcr.io").unwrap().is_none());
}

#[test]
fn test_docker_config_keychain_skips_malformed_file() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    let good = dir.path().join("good.json");
    fs::write(&broken, "{ not json").unwrap();
    fs::write(&good, r#"{"auths": {"ghcr.io": {"auth": "dXNlcjpwYXNz"}}}"#).unwrap();

    let keychain = DockerConfigKeychain::with_paths(vec![broken, good]);
    assert!(keychain.resolve("ghcr.io").unwrap().is_some());
}

#[test]
fn test_multi_keychain_prefers_first() {
    let mut first = HashMap::new();
    first.insert(
        "ghcr.io".to_string(),
        AuthConfig::new("first".to_string(), "1".to_string()),
    );
    let mut second = HashMap::new();
    second.insert(
        "ghcr.io".to_string(),
        AuthConfig::new("second".to_string(), "2".to_string()),
    );
    second.insert(
        "quay.io".to_string(),
        AuthConfig::new("quay".to_string(), "3".to_string()),
    );

    let keychains: Vec<Box<dyn Keychain>> = vec![
        Box::new(StaticKeychain::new(first)),
        Box::new(StaticKeychain::new(second)),
    ];
    let keychain = MultiKeychain::new(keychains);

    let ghcr = keychain.resolve("ghcr.io").unwrap().unwrap();
    assert_eq!(ghcr.username.as_deref(), Some("first"));
    let quay = keychain.resolve("quay.io").unwrap().unwrap();
    assert_eq!(quay.username.as_deref(), Some("quay"));
    assert!(keychain.resolve("gcr.io").unwrap().is_none());
}
