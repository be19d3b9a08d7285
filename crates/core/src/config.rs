//! 설정 관리 -- fleetform.toml 파싱 및 런타임 설정
//!
//! [`FleetformConfig`]는 로깅, Docker 연결, 조정 동작, 그리고 원하는 컨테이너
//! 목록([`DesiredMap`])을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`FLEETFORM_RECONCILE_PREFIX=app_` 형식)
//! 3. 설정 파일 (`fleetform.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), fleetform_core::error::FleetformError> {
//! use fleetform_core::config::FleetformConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = FleetformConfig::load("fleetform.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = FleetformConfig::parse("[reconcile]\nprefix = \"app_\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, FleetformError};
use crate::types::{DesiredMap, is_valid_resource_name};

/// 설정 상한값 상수
const MAX_DOCKER_TIMEOUT_SECS: u64 = 3600;
const MAX_TASK_TIMEOUT_SECS: u64 = 3600;
const MAX_CONCURRENT_TASKS: usize = 256;

/// 레이블 키/값이 비어 있을 때 생성 리소스에 기록하는 소유 표시 레이블
pub const DEFAULT_MARKER_KEY: &str = "source";
pub const DEFAULT_MARKER_VALUE: &str = "fleetform";

/// fleetform 통합 설정
///
/// `fleetform.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetformConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Docker 연결 설정
    #[serde(default)]
    pub docker: DockerConfig,
    /// 조정 동작 설정
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// 원하는 컨테이너 목록 (`[containers.<name>]`)
    #[serde(default)]
    pub containers: DesiredMap,
}

impl FleetformConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FleetformError> {
        let mut config = Self::read(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, FleetformError> {
        let config = Self::read(path).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read(path: impl AsRef<Path>) -> Result<Self, FleetformError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FleetformError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                FleetformError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, FleetformError> {
        toml::from_str(toml_str).map_err(|e| {
            FleetformError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `FLEETFORM_{SECTION}_{FIELD}`
    /// 컨테이너 목록은 환경변수로 오버라이드하지 않습니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "FLEETFORM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "FLEETFORM_GENERAL_LOG_FORMAT");

        // Docker
        override_string(&mut self.docker.socket, "FLEETFORM_DOCKER_SOCKET");
        override_parsed(&mut self.docker.timeout_secs, "FLEETFORM_DOCKER_TIMEOUT_SECS");

        // Reconcile
        override_string(&mut self.reconcile.prefix, "FLEETFORM_RECONCILE_PREFIX");
        override_string(
            &mut self.reconcile.hash_label,
            "FLEETFORM_RECONCILE_HASH_LABEL",
        );
        override_string(&mut self.reconcile.label_key, "FLEETFORM_RECONCILE_LABEL_KEY");
        override_string(
            &mut self.reconcile.label_value,
            "FLEETFORM_RECONCILE_LABEL_VALUE",
        );
        override_parsed(
            &mut self.reconcile.batch_image_pulls,
            "FLEETFORM_RECONCILE_BATCH_IMAGE_PULLS",
        );
        override_parsed(
            &mut self.reconcile.batch_network_attach,
            "FLEETFORM_RECONCILE_BATCH_NETWORK_ATTACH",
        );
        override_parsed(
            &mut self.reconcile.on_failure,
            "FLEETFORM_RECONCILE_ON_FAILURE",
        );
        override_parsed(
            &mut self.reconcile.task_timeout_secs,
            "FLEETFORM_RECONCILE_TASK_TIMEOUT_SECS",
        );
        override_parsed(
            &mut self.reconcile.max_concurrent_tasks,
            "FLEETFORM_RECONCILE_MAX_CONCURRENT_TASKS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), FleetformError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.docker.timeout_secs == 0 || self.docker.timeout_secs > MAX_DOCKER_TIMEOUT_SECS {
            return Err(invalid(
                "docker.timeout_secs",
                format!("must be 1-{MAX_DOCKER_TIMEOUT_SECS}"),
            ));
        }

        self.reconcile.validate()?;

        let prefix = self.reconcile.prefix.as_str();
        for (name, plan) in &self.containers {
            let physical = format!("{prefix}{name}");
            if name.is_empty() || !is_valid_resource_name(&physical) {
                return Err(invalid(
                    &format!("containers.{name}"),
                    format!("'{physical}' is not a valid container name"),
                ));
            }
            if !plan.enabled {
                continue;
            }
            if plan.image.trim().is_empty() {
                return Err(invalid(
                    &format!("containers.{name}.image"),
                    "image must not be empty".to_owned(),
                ));
            }
            for network in &plan.networks {
                let physical = format!("{prefix}{network}");
                if network.is_empty() || !is_valid_resource_name(&physical) {
                    return Err(invalid(
                        &format!("containers.{name}.networks"),
                        format!("'{physical}' is not a valid network name"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// 활성화된 컨테이너 수를 반환합니다.
    pub fn enabled_count(&self) -> usize {
        self.containers.values().filter(|p| p.enabled).count()
    }
}

fn invalid(field: &str, reason: String) -> FleetformError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Docker 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker 소켓 경로 (비어 있으면 플랫폼 기본값)
    pub socket: String,
    /// API 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: String::new(),
            timeout_secs: 120,
        }
    }
}

/// 스테이지 실패 시 실행기 동작
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 실패한 스테이지 이후의 스테이지를 실행하지 않음
    #[default]
    Abort,
    /// 실패와 무관하게 모든 스테이지를 시도
    Continue,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Continue => write!(f, "continue"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(ConfigError::InvalidValue {
                field: "reconcile.on_failure".to_owned(),
                reason: format!("unknown policy '{other}', expected abort or continue"),
            }),
        }
    }
}

/// 조정 동작 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// 물리 리소스 이름에 붙는 네임스페이스 접두어
    pub prefix: String,
    /// 핑거프린트를 저장하는 레이블 키
    pub hash_label: String,
    /// 소유 표시 레이블 키 (비어 있으면 레이블 필터 생략)
    pub label_key: String,
    /// 소유 표시 레이블 값 (비어 있으면 레이블 필터 생략)
    pub label_value: String,
    /// 이미지 풀을 하나의 병렬 스테이지로 묶을지 여부
    pub batch_image_pulls: bool,
    /// 컨테이너별 네트워크 연결을 하나의 병렬 스테이지로 묶을지 여부
    pub batch_network_attach: bool,
    /// 스테이지 실패 시 동작
    pub on_failure: FailurePolicy,
    /// 태스크 하나의 타임아웃 (초)
    pub task_timeout_secs: u64,
    /// 스테이지 안에서 동시에 실행할 최대 태스크 수
    pub max_concurrent_tasks: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            prefix: "ff_".to_owned(),
            hash_label: "ff_hash".to_owned(),
            label_key: DEFAULT_MARKER_KEY.to_owned(),
            label_value: DEFAULT_MARKER_VALUE.to_owned(),
            batch_image_pulls: false,
            batch_network_attach: false,
            on_failure: FailurePolicy::Abort,
            task_timeout_secs: 300,
            max_concurrent_tasks: 16,
        }
    }
}

impl ReconcileConfig {
    /// 조정 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), FleetformError> {
        if self.prefix.is_empty() {
            return Err(invalid(
                "reconcile.prefix",
                "prefix must not be empty".to_owned(),
            ));
        }
        if !is_valid_resource_name(&self.prefix) {
            return Err(invalid(
                "reconcile.prefix",
                format!("'{}' contains characters not allowed in resource names", self.prefix),
            ));
        }
        if self.hash_label.is_empty() {
            return Err(invalid(
                "reconcile.hash_label",
                "hash_label must not be empty".to_owned(),
            ));
        }
        if self.task_timeout_secs == 0 || self.task_timeout_secs > MAX_TASK_TIMEOUT_SECS {
            return Err(invalid(
                "reconcile.task_timeout_secs",
                format!("must be 1-{MAX_TASK_TIMEOUT_SECS}"),
            ));
        }
        if self.max_concurrent_tasks == 0 || self.max_concurrent_tasks > MAX_CONCURRENT_TASKS {
            return Err(invalid(
                "reconcile.max_concurrent_tasks",
                format!("must be 1-{MAX_CONCURRENT_TASKS}"),
            ));
        }
        Ok(())
    }

    /// 관측 시 사용할 레이블 필터를 반환합니다.
    ///
    /// 키나 값 중 하나라도 비어 있으면 `None`이며, 이 경우 접두어만으로 필터링합니다.
    pub fn label_filter(&self) -> Option<(&str, &str)> {
        if self.label_key.is_empty() || self.label_value.is_empty() {
            None
        } else {
            Some((self.label_key.as_str(), self.label_value.as_str()))
        }
    }

    /// 생성 리소스에 기록하고 소유 확인에 쓰는 표시 레이블을 반환합니다.
    ///
    /// 관측 필터가 꺼져 있어도 항상 값이 있으며, 이때는 기본 표시 레이블을 씁니다.
    pub fn marker(&self) -> (&str, &str) {
        self.label_filter()
            .unwrap_or((DEFAULT_MARKER_KEY, DEFAULT_MARKER_VALUE))
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse value from env var, ignoring"
            ),
        }
    }
}
