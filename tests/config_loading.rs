//! Loading and validating the TOML configuration.

use guildcraft::config::Config;
use tempfile::TempDir;

#[tokio::test]
async fn default_config_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");
    let path = path.to_str().expect("utf8 path");

    Config::create_default(path).await.expect("write default");
    let cfg = Config::load(path).await.expect("load default");
    assert_eq!(cfg.bot.command_prefix, "!");
    assert_eq!(cfg.bot.prompt_timeout_secs, 120);
    assert_eq!(cfg.bot.max_item_name_len, 64);
    assert!(cfg.storage.economy_db_path().ends_with("economy"));
}

#[test]
fn optional_bot_fields_fall_back_to_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[bot]
name = "test"
command_prefix = "gc!"

[storage]
data_dir = "/tmp/gc"
db_path = "/tmp/gc/custom"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let cfg = tokio_test::block_on(Config::load(path.to_str().unwrap())).expect("load");
    assert_eq!(cfg.bot.command_prefix, "gc!");
    assert_eq!(cfg.bot.prompt_timeout_secs, 120);
    assert_eq!(cfg.storage.economy_db_path(), std::path::PathBuf::from("/tmp/gc/custom"));
    assert_eq!(cfg.logging.level_filter(), log::LevelFilter::Debug);
    assert!(cfg.logging.file.is_none());
}

#[test]
fn invalid_values_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[bot]
name = "test"
command_prefix = "  "
prompt_timeout_secs = 0

[storage]
data_dir = "./data"

[logging]
level = "info"
"#,
    )
    .unwrap();

    let err = tokio_test::block_on(Config::load(path.to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("command_prefix"), "{}", err);
}

#[test]
fn missing_file_is_an_error() {
    let err = tokio_test::block_on(Config::load("/nonexistent/guildcraft.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
