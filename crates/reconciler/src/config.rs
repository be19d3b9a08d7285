//! 조정기 설정
//!
//! [`ReconcilerConfig`]는 core의 [`ReconcileConfig`]를
//! 기반으로 관측, 플랜 생성, 실행에 필요한 값을 한곳에 모읍니다.
//!
//! # 사용 예시
//! ```ignore
//! use fleetform_core::config::FleetformConfig;
//! use fleetform_reconciler::config::ReconcilerConfig;
//!
//! let core_config = FleetformConfig::default();
//! let config = ReconcilerConfig::from_core(&core_config.reconcile);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use fleetform_core::config::{FailurePolicy, ReconcileConfig};
use fleetform_core::types::is_valid_resource_name;

use crate::error::ReconcileError;
use crate::planner::PlanOptions;

/// 설정 상한값 상수
const MAX_TASK_TIMEOUT_SECS: u64 = 3600;
const MAX_CONCURRENT_TASKS: usize = 256;

/// 조정기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// 물리 이름 접두사
    pub prefix: String,
    /// 핑거프린트 레이블 키
    pub hash_label: String,
    /// 생성 리소스에 기록하는 소유 표시 레이블 (key, value)
    pub marker: (String, String),
    /// 관측 시 소유 표시 레이블로 거를지 여부
    pub filter_by_marker: bool,
    /// 이미지 풀 스테이지 병합 여부
    pub batch_image_pulls: bool,
    /// 네트워크 연결 스테이지 병합 여부
    pub batch_network_attach: bool,
    /// 스테이지 실패 시 동작
    pub on_failure: FailurePolicy,
    /// 태스크 타임아웃 (초)
    pub task_timeout_secs: u64,
    /// 스테이지 내 동시 실행 태스크 수
    pub max_concurrent_tasks: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::from_core(&ReconcileConfig::default())
    }
}

impl ReconcilerConfig {
    /// core의 `ReconcileConfig`에서 조정기 설정을 생성합니다.
    pub fn from_core(core: &ReconcileConfig) -> Self {
        Self {
            prefix: core.prefix.clone(),
            hash_label: core.hash_label.clone(),
            marker: {
                let (key, value) = core.marker();
                (key.to_owned(), value.to_owned())
            },
            filter_by_marker: core.label_filter().is_some(),
            batch_image_pulls: core.batch_image_pulls,
            batch_network_attach: core.batch_network_attach,
            on_failure: core.on_failure,
            task_timeout_secs: core.task_timeout_secs,
            max_concurrent_tasks: core.max_concurrent_tasks,
        }
    }

    /// 플랜 생성 옵션
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            batch_image_pulls: self.batch_image_pulls,
            batch_network_attach: self.batch_network_attach,
        }
    }

    /// 관측 레이블 필터. 필터가 꺼져 있으면 `None`
    pub fn label_filter(&self) -> Option<(&str, &str)> {
        self.filter_by_marker
            .then(|| (self.marker.0.as_str(), self.marker.1.as_str()))
    }

    /// 태스크 타임아웃
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.prefix.is_empty() || !is_valid_resource_name(&self.prefix) {
            return Err(ReconcileError::Config {
                field: "prefix".to_owned(),
                reason: format!("'{}' is not a valid name prefix", self.prefix),
            });
        }

        if self.hash_label.is_empty() {
            return Err(ReconcileError::Config {
                field: "hash_label".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.marker.0.is_empty() || self.marker.1.is_empty() {
            return Err(ReconcileError::Config {
                field: "marker".to_owned(),
                reason: "marker key and value must both be set".to_owned(),
            });
        }

        if self.task_timeout_secs == 0 || self.task_timeout_secs > MAX_TASK_TIMEOUT_SECS {
            return Err(ReconcileError::Config {
                field: "task_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TASK_TIMEOUT_SECS}"),
            });
        }

        if self.max_concurrent_tasks == 0 || self.max_concurrent_tasks > MAX_CONCURRENT_TASKS {
            return Err(ReconcileError::Config {
                field: "max_concurrent_tasks".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_TASKS}"),
            });
        }

        Ok(())
    }
}

/// 조정기 설정 빌더
#[derive(Default)]
pub struct ReconcilerConfigBuilder {
    config: ReconcilerConfig,
}

impl ReconcilerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 이름 접두사를 설정합니다.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// 핑거프린트 레이블 키를 설정합니다.
    pub fn hash_label(mut self, label: impl Into<String>) -> Self {
        self.config.hash_label = label.into();
        self
    }

    /// 소유 표시 레이블을 설정합니다.
    pub fn marker(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.marker = (key.into(), value.into());
        self
    }

    /// 관측 시 레이블 필터 없이 접두사만으로 거릅니다. 생성 리소스의 표시 레이블은 유지됩니다.
    pub fn without_label_filter(mut self) -> Self {
        self.config.filter_by_marker = false;
        self
    }

    /// 플랜 생성 옵션을 설정합니다.
    pub fn plan_options(mut self, options: PlanOptions) -> Self {
        self.config.batch_image_pulls = options.batch_image_pulls;
        self.config.batch_network_attach = options.batch_network_attach;
        self
    }

    /// 실패 정책을 설정합니다.
    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.config.on_failure = policy;
        self
    }

    /// 태스크 타임아웃(초)을 설정합니다.
    pub fn task_timeout_secs(mut self, secs: u64) -> Self {
        self.config.task_timeout_secs = secs;
        self
    }

    /// 동시 실행 태스크 수를 설정합니다.
    pub fn max_concurrent_tasks(mut self, max: usize) -> Self {
        self.config.max_concurrent_tasks = max;
        self
    }

    /// 설정을 검증하고 `ReconcilerConfig`를 생성합니다.
    pub fn build(self) -> Result<ReconcilerConfig, ReconcileError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
