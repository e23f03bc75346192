//! Multi-format configuration tests

use super::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct TestChainConfig {
    combination_strategy: String,
    system_prompt: Option<String>,
    retrieval_k: Option<usize>,
    notifier: Option<TestNotifier>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct TestNotifier {
    endpoint: String,
    user_id: Option<String>,
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_detect_format() {
    assert_eq!(detect_format("chain.yaml").unwrap(), FileFormat::Yaml);
    assert_eq!(detect_format("chain.yml").unwrap(), FileFormat::Yaml);
    assert_eq!(detect_format("chain.toml").unwrap(), FileFormat::Toml);
    assert_eq!(detect_format("chain.json").unwrap(), FileFormat::Json);
    assert_eq!(detect_format("chain.ini").unwrap(), FileFormat::Ini);
    assert_eq!(detect_format("chain.ron").unwrap(), FileFormat::Ron);
    assert_eq!(detect_format("chain.json5").unwrap(), FileFormat::Json5);
    assert!(matches!(
        detect_format("chain.txt"),
        Err(ConfigError::UnsupportedFormat(_))
    ));
    assert!(detect_format("chain").is_err());
}

#[test]
fn test_from_str_toml() {
    let toml = r#"
combination_strategy = "map_reduce"
retrieval_k = 6

[notifier]
endpoint = "https://transcripts.local/save"
"#;

    let config: TestChainConfig = from_str(toml, FileFormat::Toml).unwrap();
    assert_eq!(config.combination_strategy, "map_reduce");
    assert_eq!(config.retrieval_k, Some(6));
    assert_eq!(
        config.notifier,
        Some(TestNotifier {
            endpoint: "https://transcripts.local/save".to_string(),
            user_id: None,
        })
    );
}

#[test]
fn test_from_str_yaml() {
    let yaml = r#"
combination_strategy: refine
system_prompt: Answer like a pirate.
"#;

    let config: TestChainConfig = from_str(yaml, FileFormat::Yaml).unwrap();
    assert_eq!(config.combination_strategy, "refine");
    assert_eq!(config.system_prompt.as_deref(), Some("Answer like a pirate."));
    assert_eq!(config.retrieval_k, None);
}

#[test]
fn test_from_str_json5() {
    let json5 = r#"
{
    // comments are allowed
    combination_strategy: "stuff",
}
"#;

    let config: TestChainConfig = from_str(json5, FileFormat::Json5).unwrap();
    assert_eq!(config.combination_strategy, "stuff");
}

#[test]
fn test_merge_configs_later_wins() {
    let base = r#"{ "combination_strategy": "stuff", "retrieval_k": 4 }"#;
    let overlay = r#"{ "retrieval_k": 8 }"#;

    let config: TestChainConfig =
        merge_configs(&[(base, FileFormat::Json), (overlay, FileFormat::Json)]).unwrap();
    assert_eq!(config.combination_strategy, "stuff");
    assert_eq!(config.retrieval_k, Some(8));
}

#[test]
fn test_substitute_env_vars() {
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("CONVQA_TEST_ENDPOINT", "https://example.test/hook") };

    let braced = substitute_env_vars("endpoint: ${CONVQA_TEST_ENDPOINT}");
    assert_eq!(braced, "endpoint: https://example.test/hook");

    let bare = substitute_env_vars("endpoint: $CONVQA_TEST_ENDPOINT");
    assert_eq!(bare, "endpoint: https://example.test/hook");

    let unknown = substitute_env_vars("endpoint: ${CONVQA_TEST_UNSET_VARIABLE}");
    assert_eq!(unknown, "endpoint: ${CONVQA_TEST_UNSET_VARIABLE}");
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "chain.yml",
        "combination_strategy: map_reduce\nretrieval_k: 3\n",
    );

    let config: TestChainConfig = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(config.combination_strategy, "map_reduce");
    assert_eq!(config.retrieval_k, Some(3));
}

#[test]
fn test_load_config_missing_file() {
    let result: ConfigResult<TestChainConfig> = load_config("/nonexistent/chain.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_with_env_override() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "chain.toml",
        "combination_strategy = \"stuff\"\nretrieval_k = 4\n",
    );

    // SAFETY: the prefix is unique to this test.
    unsafe { std::env::set_var("CONVQATESTENV_RETRIEVAL_K", "9") };

    let config: TestChainConfig =
        load_with_env(path.to_str().unwrap(), "CONVQATESTENV").unwrap();
    assert_eq!(config.retrieval_k, Some(9));
    assert_eq!(config.combination_strategy, "stuff");
}
