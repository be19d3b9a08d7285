//! 조정기 에러 타입
//!
//! [`ReconcileError`]는 관측, 태스크 디스패치, 플랜 실행 중 발생하는 모든 에러를 표현합니다.
//! `From<ReconcileError> for FleetformError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 플랜 생성([`generate_plan`](crate::planner::generate_plan))은 순수 함수이므로
//! 이 에러를 반환하지 않습니다.

use fleetform_core::error::{BackendError, ConfigError, FleetformError};

/// 조정기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Docker API 호출 실패
    #[error("docker api error: {0}")]
    DockerApi(String),

    /// Docker 소켓 연결 실패
    #[error("docker connection error: {0}")]
    DockerConnection(String),

    /// 리소스를 찾을 수 없음
    #[error("resource not found: {0}")]
    NotFound(String),

    /// 소유 표시 레이블이 없는 리소스에 대한 변경 시도
    #[error("refusing to modify '{0}': missing ownership label")]
    NotOwned(String),

    /// Docker 리소스 이름 규칙 위반
    #[error("invalid resource name: '{0}'")]
    InvalidName(String),

    /// 태스크 실행 실패
    #[error("task '{task}' failed: {reason}")]
    TaskFailed {
        /// 실패한 태스크 표시 문자열
        task: String,
        /// 실패 사유
        reason: String,
    },

    /// 태스크 타임아웃
    #[error("task '{task}' timed out after {timeout_secs}s")]
    TaskTimeout {
        /// 타임아웃된 태스크 표시 문자열
        task: String,
        /// 적용된 타임아웃 (초)
        timeout_secs: u64,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ReconcileError> for FleetformError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::DockerApi(msg) => FleetformError::Backend(BackendError::Api(msg)),
            ReconcileError::DockerConnection(msg) => {
                FleetformError::Backend(BackendError::Connection(msg))
            }
            ReconcileError::NotFound(name) => FleetformError::Backend(BackendError::NotFound(name)),
            ReconcileError::NotOwned(name) => FleetformError::Backend(BackendError::NotOwned(name)),
            ReconcileError::InvalidName(name) => FleetformError::Config(ConfigError::InvalidValue {
                field: "name".to_owned(),
                reason: format!("'{name}' is not a valid resource name"),
            }),
            err @ (ReconcileError::TaskFailed { .. } | ReconcileError::TaskTimeout { .. }) => {
                FleetformError::Backend(BackendError::Task(err.to_string()))
            }
            ReconcileError::Config { field, reason } => {
                FleetformError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
