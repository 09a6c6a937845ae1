use hey_core::{AppPaths, HeyError, Settings};
use tempfile::TempDir;

// ========================================================================
// Settings Tests (config/mod.rs)
// ========================================================================

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert!(!settings.tos);
    assert_eq!(settings.model, "claude-3-haiku-20240307");
    assert!(settings.prompt.is_none());
    assert!(settings.proxy.is_none());
    assert!(settings.socks_proxy.is_none());
    assert_eq!(settings.timeout_secs, 30);
}

#[test]
fn test_settings_load_returns_default_when_no_file() {
    let dir = TempDir::new().unwrap();
    let paths = AppPaths::new(dir.path(), dir.path().join("cache"));

    assert_eq!(Settings::load(&paths), Settings::default());
}

#[test]
fn test_settings_save_and_reload_roundtrip() {
    let dir = TempDir::new().unwrap();
    let paths = AppPaths::new(dir.path().join("config"), dir.path().join("cache"));

    let settings = Settings {
        tos: true,
        model: "gpt-4o-mini".to_string(),
        prompt: Some("Answer briefly".to_string()),
        proxy: Some("http://proxy:8080".to_string()),
        socks_proxy: None,
        timeout_secs: 12,
    };
    settings.save(&paths).unwrap();

    assert!(paths.config_path().exists());
    assert_eq!(Settings::load(&paths), settings);

    let raw = std::fs::read_to_string(paths.config_path()).unwrap();
    assert!(!raw.contains("socks_proxy"), "unset options are not written");
}

#[test]
fn test_settings_invalid_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.toml");
    std::fs::write(&path, "tos = [this is not toml").unwrap();

    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn test_settings_respects_custom_file_name() {
    let dir = TempDir::new().unwrap();
    let mut paths = AppPaths::new(dir.path(), dir.path());
    paths.config_file = "profile.toml".to_string();

    let settings = Settings {
        tos: true,
        ..Settings::default()
    };
    settings.save(&paths).unwrap();
    assert!(dir.path().join("profile.toml").exists());
}

#[test]
fn test_save_to_unwritable_location_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();

    let err = Settings::default()
        .save_to(&blocker.join("conf.toml"))
        .unwrap_err();
    assert!(matches!(err, HeyError::Persistence { .. }));
}

#[test]
fn test_build_http_client_with_valid_proxy() {
    let settings = Settings {
        proxy: Some("http://127.0.0.1:3128".to_string()),
        ..Settings::default()
    };
    assert!(settings.build_http_client().is_ok());
}

#[test]
fn test_build_http_client_rejects_unknown_proxy_scheme() {
    let settings = Settings {
        proxy: Some("ftp://proxy.example:21".to_string()),
        ..Settings::default()
    };
    let err = settings.build_http_client().unwrap_err();
    assert!(matches!(err, HeyError::Config(_)));
}
