//! Integration tests for flagstone-config

use flagstone_config::*;
use std::env;
use std::io::Write;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "options.json",
        r#"{
            "namespace": "checkout",
            "projectEnvId": 9,
            "onNoDefault": "ignore",
            "globalContext": {"app": {"name": "shop"}}
        }"#,
    );

    let options = OptionsBuilder::new().with_file(&path).build().unwrap();

    assert_eq!(options.namespace.as_deref(), Some("checkout"));
    assert_eq!(options.project_env_id, Some(9));
    assert_eq!(options.on_no_default, OnNoDefault::Ignore);
    assert!(options.global_context.get("app").is_some());
}

#[test]
fn test_toml_then_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let toml = write_file(
        &dir,
        "options.toml",
        r#"
            namespace = "checkout"
            max_evaluation_depth = 8
        "#,
    );
    let env_file = write_file(
        &dir,
        "overrides.env",
        "FLAGSTONE_MAX_EVALUATION_DEPTH=3\nFLAGSTONE_COLLECT_EVALUATION_SUMMARIES=false\n",
    );

    let options = OptionsBuilder::new()
        .with_file(&toml)
        .with_file(&env_file)
        .build()
        .unwrap();

    assert_eq!(options.namespace.as_deref(), Some("checkout"));
    assert_eq!(options.max_evaluation_depth, 3);
    assert!(!options.collect_evaluation_summaries);
}

#[test]
fn test_dotenv_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, ".env", "FLAGSTONE_ON_NO_DEFAULT=warn\n");

    let options = OptionsBuilder::new()
        .with_dotenv(path.to_str())
        .build()
        .unwrap();
    assert_eq!(options.on_no_default, OnNoDefault::Warn);
}

#[test]
fn test_missing_file() {
    let result = OptionsBuilder::new()
        .with_file("/definitely/not/here/options.json")
        .build();
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_invalid_file_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "options.json", r#"{"namespace": ""}"#);

    let result = OptionsBuilder::new().with_file(&path).build();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_process_env_with_custom_prefix() {
    unsafe {
        env::set_var("FLAGSTONE_IT_NAMESPACE", "from-env");
        env::set_var("FLAGSTONE_IT_PROJECT_ENV_ID", "21");
    }

    let options = OptionsBuilder::new()
        .with_prefix("FLAGSTONE_IT")
        .with_env()
        .build()
        .unwrap();

    assert_eq!(options.namespace.as_deref(), Some("from-env"));
    assert_eq!(options.project_env_id, Some(21));

    unsafe {
        env::remove_var("FLAGSTONE_IT_NAMESPACE");
        env::remove_var("FLAGSTONE_IT_PROJECT_ENV_ID");
    }
}

#[test]
fn test_env_loader() {
    let loader = EnvLoader::new(Some("FLAGSTONE_LOADER_IT".to_string()));

    unsafe {
        env::set_var("FLAGSTONE_LOADER_IT_TOKEN", "abc");
    }

    assert_eq!(loader.load().get("token").map(String::as_str), Some("abc"));

    unsafe {
        env::remove_var("FLAGSTONE_LOADER_IT_TOKEN");
    }
}

#[test]
fn test_validator() {
    assert!(ConfigValidator::in_range(16usize, 1, MAX_EVALUATION_DEPTH_LIMIT, "depth").is_ok());
    assert!(ResolverOptions::default().validate().is_ok());
}
