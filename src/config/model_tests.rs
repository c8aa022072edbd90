use super::*;

#[test]
fn parses_full_config() {
    let config: CheckConfig = toml::from_str(
        r#"
version = "1"
use = ["STYLE", "SYNTAX_UNSPECIFIED"]
except = ["FIELD_LOWER_SNAKE_CASE"]

[options]
timestamp_suffix = "_at"
"#,
    )
    .unwrap();
    assert_eq!(config.version.as_deref(), Some(CONFIG_VERSION));
    assert_eq!(config.use_ids, vec!["STYLE", "SYNTAX_UNSPECIFIED"]);
    assert_eq!(config.except, vec!["FIELD_LOWER_SNAKE_CASE"]);
    assert_eq!(config.options["timestamp_suffix"], "_at");
}

#[test]
fn empty_document_is_default() {
    let config: CheckConfig = toml::from_str("").unwrap();
    assert_eq!(config, CheckConfig::default());
}

#[test]
fn unknown_keys_are_rejected() {
    let result: Result<CheckConfig, _> = toml::from_str("ignore = [\"STYLE\"]\n");
    assert!(result.is_err());
}

#[test]
fn serializes_use_under_its_toml_name() {
    let config = CheckConfig {
        use_ids: vec!["STYLE".to_string()],
        ..CheckConfig::default()
    };
    let rendered = toml::to_string(&config).unwrap();
    assert!(rendered.contains("use = [\"STYLE\"]"));
    assert!(!rendered.contains("except"));
}
