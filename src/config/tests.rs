use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.database_url, "data.db");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 5000);
    assert!(config.jwt_secret.is_none());
    assert_eq!(config.access_token_minutes, 15);
    assert_eq!(config.refresh_token_days, 30);
    assert!(config.log_dir.is_none());
    assert!(!config.log_json);
}

#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("data.db").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
}

#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        jwt_secret: Some("s3cret".to_string()),
        ..Default::default()
    };

    let updated = base_config(None).apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.jwt_secret.as_deref(), Some("s3cret"));
    assert_eq!(updated.port, 5000); // Unchanged
    assert_eq!(updated.access_token_minutes, 15); // Unchanged
}

#[test]
fn test_apply_update_keeps_existing_optional_values() {
    let config = Config {
        jwt_secret: Some("from-file".to_string()),
        log_dir: Some(PathBuf::from("/var/log/stores")),
        ..base_config(None)
    };

    let updated = config.apply_update(ConfigUpdate::default());

    assert_eq!(updated.jwt_secret.as_deref(), Some("from-file"));
    assert_eq!(updated.log_dir, Some(PathBuf::from("/var/log/stores")));
}

#[test]
fn test_token_ttls() {
    let config = base_config(None);

    assert_eq!(config.access_token_ttl(), Duration::from_secs(15 * 60));
    assert_eq!(config.refresh_token_ttl(), Duration::from_secs(30 * 24 * 60 * 60));
}

#[test]
fn test_token_ttls_saturate_on_huge_values() {
    let config = Config {
        access_token_minutes: u64::MAX,
        refresh_token_days: u64::MAX / 2,
        ..base_config(None)
    };
    assert_eq!(config.access_token_ttl(), Duration::from_secs(u64::MAX));
    assert_eq!(config.refresh_token_ttl(), Duration::from_secs(u64::MAX));
}

#[test]
fn test_socket_addr() {
    let config = base_config(None);
    assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:5000".parse().unwrap());

    let bad = Config { host: "not a host".to_string(), ..base_config(None) };
    assert!(bad.socket_addr().is_err());
}

#[test]
fn test_config_from_args() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        port: Some(8080),
        debug: true,
        ..Default::default()
    };

    let update = config_from_args(&args);

    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.port, Some(8080));
    assert_eq!(update.host, None);
    assert_eq!(update.jwt_secret, None);
}

#[test]
fn test_cli_args_parse_flags() {
    let args = CliArgs::try_parse_from([
        "stores-api",
        "--database-url", "flag.db",
        "--port", "9000",
        "--log-json", "true",
    ]).unwrap();

    assert_eq!(args.database_url.as_deref(), Some("flag.db"));
    assert_eq!(args.port, Some(9000));
    assert_eq!(args.log_json, Some(true));
}

#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();
    assert_eq!(update.database_url, None);
    assert_eq!(update.port, None);
}

#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = create_test_config_file(&temp_dir, r#"
        database_url = "file.db"
        port = 8000
        jwt_secret = "file-secret"
        access_token_minutes = 5
        log_json = true
    "#);

    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.port, Some(8000));
    assert_eq!(update.jwt_secret, Some("file-secret".to_string()));
    assert_eq!(update.access_token_minutes, Some(5));
    assert_eq!(update.refresh_token_days, None);
    assert_eq!(update.log_json, Some(true));
}

#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = create_test_config_file(&temp_dir, r#"
        port = "not a number"
    "#);

    assert!(config_from_file(Some(config_path)).is_err());
}

#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();
    assert_eq!(update.database_url, None);
}

#[test]
fn test_precedence_args_over_file_over_base() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..Default::default()
    };
    let file_update = ConfigUpdate {
        database_url: Some("file.db".to_string()),
        port: Some(7000),
        ..Default::default()
    };

    let config = base_config(None)
        .apply_update(file_update)
        .apply_update(config_from_args(&args));

    assert_eq!(config.database_url, "args.db");
    assert_eq!(config.port, 7000); // From file
    assert_eq!(config.refresh_token_days, 30); // From base
}
