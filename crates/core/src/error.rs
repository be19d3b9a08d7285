//! 에러 타입 -- 도메인별 에러 정의

/// fleetform 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum FleetformError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 컨테이너 런타임 백엔드 에러
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 컨테이너 런타임 백엔드 에러
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 데몬 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// API 호출 실패
    #[error("api call failed: {0}")]
    Api(String),

    /// 리소스를 찾을 수 없음
    #[error("resource not found: {0}")]
    NotFound(String),

    /// 이 도구가 관리하지 않는 리소스
    #[error("resource '{0}' is not managed by fleetform")]
    NotOwned(String),

    /// 태스크 실행 실패
    #[error("task failed: {0}")]
    Task(String),
}
