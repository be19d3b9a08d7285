//! fleetform.toml 통합 설정 테스트
//!
//! - fleetform.toml.example 파싱 테스트
//! - 파일 로딩 / 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use std::io::Write;

use fleetform_core::config::{FailurePolicy, FleetformConfig};
use fleetform_core::error::{ConfigError, FleetformError};
use serial_test::serial;

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../fleetform.toml.example");
    let config = FleetformConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.reconcile.prefix, "ff_");
    assert_eq!(config.reconcile.on_failure, FailurePolicy::Abort);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../fleetform.toml.example");
    let config = FleetformConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_declares_containers() {
    let content = include_str!("../../../fleetform.toml.example");
    let config = FleetformConfig::parse(content).expect("should parse");

    let web = config.containers.get("web").expect("web container");
    assert_eq!(web.image_ref(), "nginx:1.27");
    assert_eq!(web.networks, vec!["frontend"]);

    let api = config.containers.get("api").expect("api container");
    assert_eq!(api.networks, vec!["frontend", "backend"]);
    assert_eq!(api.restart.as_deref(), Some("unless-stopped"));

    let worker = config.containers.get("worker").expect("worker container");
    assert!(!worker.enabled);
    assert_eq!(config.enabled_count(), 3);
}

#[tokio::test]
#[serial]
async fn load_applies_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[reconcile]\nprefix = \"file_\"").expect("write");

    // SAFETY: serial_test로 환경변수를 건드리는 테스트를 직렬화합니다.
    unsafe { std::env::set_var("FLEETFORM_RECONCILE_PREFIX", "env_") };
    let config = FleetformConfig::load(file.path()).await.expect("load");
    unsafe { std::env::remove_var("FLEETFORM_RECONCILE_PREFIX") };

    assert_eq!(config.reconcile.prefix, "env_");
}

#[tokio::test]
#[serial]
async fn from_file_ignores_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[reconcile]\nprefix = \"file_\"").expect("write");

    // SAFETY: serial_test로 환경변수를 건드리는 테스트를 직렬화합니다.
    unsafe { std::env::set_var("FLEETFORM_RECONCILE_PREFIX", "env_") };
    let config = FleetformConfig::from_file(file.path()).await.expect("load");
    unsafe { std::env::remove_var("FLEETFORM_RECONCILE_PREFIX") };

    assert_eq!(config.reconcile.prefix, "file_");
}

#[tokio::test]
async fn load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[containers.web]\nimage = \"\"").expect("write");

    let err = FleetformConfig::load(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        FleetformError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn wrong_type_is_parse_error() {
    let err = FleetformConfig::parse("[reconcile]\nmax_concurrent_tasks = \"many\"").unwrap_err();
    assert!(matches!(
        err,
        FleetformError::Config(ConfigError::ParseFailed { .. })
    ));
}
