//! fleetform 공통 크레이트
//!
//! 단일 호스트 컨테이너 플릿 관리자의 모든 크레이트가 공유하는
//! 에러 타입, 설정(`fleetform.toml`), 도메인 타입, 메트릭 이름을 정의합니다.
//!
//! # 모듈 구조
//!
//! - [`error`]: 도메인 에러 (`FleetformError`, `ConfigError`, `BackendError`)
//! - [`config`]: 설정 로딩 및 검증 (`FleetformConfig`)
//! - [`types`]: 원하는 상태와 관측 상태 (`ResourcePlan`, `DesiredMap`, `ObservedState`)
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{BackendError, ConfigError, FleetformError};

// 설정
pub use config::FleetformConfig;

// 도메인 타입
pub use types::{DEFAULT_TAG, DesiredMap, ObservedState, ResourcePlan, is_valid_resource_name};
