//! Configuration loading from files and the environment.

use apidispatch::logging::LogFormat;
use apidispatch::{DispatchConfig, Dispatcher};
use http::Method;
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "base_path: /api/v1\nextra_verbs:\n  - PATCH\nlog:\n  level: warn\n  format: pretty"
    )
    .unwrap();

    let config = DispatchConfig::load(file.path()).unwrap();
    assert_eq!(config.base_path, "/api/v1");
    assert_eq!(config.extra_verbs, vec!["PATCH"]);
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.log.format, LogFormat::Pretty);

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    assert_eq!(dispatcher.routes().base_path(), "/api/v1");
    assert_eq!(
        dispatcher.verbs(),
        &[Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]
    );
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = DispatchConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn test_invalid_extra_verb_fails_dispatcher_construction() {
    let config = DispatchConfig::from_yaml_str("extra_verbs: ['BAD VERB']").unwrap();
    assert!(Dispatcher::from_config(&config).is_err());
}

// The only test in this binary that touches the process environment.
#[test]
fn test_environment_overrides() {
    std::env::set_var("APIDISPATCH_BASE_PATH", "/env");
    std::env::set_var("APIDISPATCH_EXTRA_VERBS", "patch, OPTIONS");
    std::env::set_var("APIDISPATCH_LOG_LEVEL", "debug");
    std::env::set_var("APIDISPATCH_LOG_FORMAT", "pretty");

    let from_env = DispatchConfig::from_env();

    let mut layered = DispatchConfig::from_yaml_str("base_path: /file\nlog:\n  level: error").unwrap();
    layered.apply_env();

    for key in [
        "APIDISPATCH_BASE_PATH",
        "APIDISPATCH_EXTRA_VERBS",
        "APIDISPATCH_LOG_LEVEL",
        "APIDISPATCH_LOG_FORMAT",
    ] {
        std::env::remove_var(key);
    }

    assert_eq!(from_env.base_path, "/env");
    assert_eq!(from_env.extra_verbs, vec!["patch", "OPTIONS"]);
    assert_eq!(
        from_env.extra_methods().unwrap(),
        vec![Method::PATCH, Method::OPTIONS]
    );
    assert_eq!(from_env.log.level, "debug");
    assert_eq!(from_env.log.format, LogFormat::Pretty);
    assert_eq!(layered, from_env);
}
