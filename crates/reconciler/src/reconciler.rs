//! 조정 주기 -- 관측, 플랜 생성, 실행
//!
//! [`Reconciler`]는 한 번의 조정 주기를 수행합니다.
//!
//! ```text
//! observe() ──> generate_plan_with() ──> PlanExecutor::execute()
//!    │                  │                        │
//! ObservedState        Plan                 ApplyReport
//! ```
//!
//! 주기마다 `uuid` v4 식별자를 만들어 로그 스팬에 붙입니다.

use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use fleetform_core::metrics as m;
use fleetform_core::types::{DesiredMap, ObservedState};

use crate::config::ReconcilerConfig;
use crate::dispatcher::TaskDispatcher;
use crate::docker::DockerBackend;
use crate::error::ReconcileError;
use crate::executor::{ApplyReport, PlanExecutor};
use crate::observer::observe;
use crate::planner::generate_plan_with;
use crate::status::{ResourceStatus, status_report};
use crate::task::Plan;

/// 호출자가 지정하는 강제 재생성 대상 (논리 이름)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenewRequest {
    /// 재생성할 컨테이너
    pub containers: Vec<String>,
    /// 재생성할 네트워크
    pub networks: Vec<String>,
}

impl RenewRequest {
    /// 빈 요청을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 컨테이너를 추가합니다.
    pub fn container(mut self, name: impl Into<String>) -> Self {
        self.containers.push(name.into());
        self
    }

    /// 네트워크를 추가합니다.
    pub fn network(mut self, name: impl Into<String>) -> Self {
        self.networks.push(name.into());
        self
    }
}

/// 플랜 생성 결과
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCycle {
    /// 주기 식별자
    pub cycle_id: Uuid,
    /// 플랜 생성에 사용한 관측 상태
    pub observed: ObservedState,
    /// 생성된 플랜
    pub plan: Plan,
}

/// 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCycle {
    /// 주기 식별자
    pub cycle_id: Uuid,
    /// 실행한 플랜
    pub plan: Plan,
    /// 실행 보고
    pub report: ApplyReport,
}

/// 조정기
pub struct Reconciler<B: DockerBackend> {
    config: ReconcilerConfig,
    backend: Arc<B>,
    executor: PlanExecutor<B>,
}

impl<B: DockerBackend> Reconciler<B> {
    /// 설정을 반환합니다.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// 백엔드를 반환합니다.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// 백엔드 연결을 확인합니다.
    pub async fn ping(&self) -> Result<(), ReconcileError> {
        self.backend.ping().await
    }

    /// 현재 상태를 관측합니다.
    pub async fn observe(&self) -> Result<ObservedState, ReconcileError> {
        observe(
            self.backend.as_ref(),
            &self.config.prefix,
            &self.config.hash_label,
            self.config.label_filter(),
        )
        .await
    }

    /// 주어진 관측 상태로 플랜을 생성합니다. 백엔드를 호출하지 않습니다.
    pub fn plan_from(
        &self,
        observed: &ObservedState,
        desired: &DesiredMap,
        renew: &RenewRequest,
    ) -> Plan {
        generate_plan_with(
            observed,
            desired,
            &renew.containers,
            &renew.networks,
            &self.config.prefix,
            self.config.plan_options(),
        )
    }

    /// 관측 후 플랜을 생성합니다.
    pub async fn plan(
        &self,
        desired: &DesiredMap,
        renew: &RenewRequest,
    ) -> Result<PlannedCycle, ReconcileError> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("plan", cycle_id = %cycle_id);
        self.plan_cycle(cycle_id, desired, renew)
            .instrument(span)
            .await
    }

    async fn plan_cycle(
        &self,
        cycle_id: Uuid,
        desired: &DesiredMap,
        renew: &RenewRequest,
    ) -> Result<PlannedCycle, ReconcileError> {
        let observed = self.observe().await?;
        let plan = self.plan_from(&observed, desired, renew);

        metrics::gauge!(m::PLAN_TASKS).set(plan.task_count() as f64);
        info!(
            stages = plan.len(),
            tasks = plan.task_count(),
            observed = %observed,
            "plan generated"
        );

        Ok(PlannedCycle {
            cycle_id,
            observed,
            plan,
        })
    }

    /// 관측, 플랜 생성, 실행을 한 번 수행합니다.
    ///
    /// 태스크 실패는 `Err`가 아니라 [`ApplyReport`]에 기록됩니다.
    /// `Err`는 관측 단계가 실패한 경우에만 반환됩니다.
    pub async fn apply(
        &self,
        desired: &DesiredMap,
        renew: &RenewRequest,
    ) -> Result<AppliedCycle, ReconcileError> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("apply", cycle_id = %cycle_id);

        async {
            metrics::counter!(m::RECONCILE_CYCLES_TOTAL).increment(1);

            let planned = self.plan_cycle(cycle_id, desired, renew).await?;
            if planned.plan.is_empty() {
                info!("already converged, nothing to apply");
            }

            let report = self.executor.execute(&planned.plan).await;
            info!(result = %report, "apply finished");

            Ok(AppliedCycle {
                cycle_id,
                plan: planned.plan,
                report,
            })
        }
        .instrument(span)
        .await
    }

    /// 이미 생성된 플랜을 실행합니다.
    pub async fn execute(&self, plan: &Plan) -> ApplyReport {
        self.executor.execute(plan).await
    }

    /// 리소스별 동기화 상태를 조회합니다.
    pub async fn status(
        &self,
        desired: &DesiredMap,
    ) -> Result<Vec<ResourceStatus>, ReconcileError> {
        let observed = self.observe().await?;
        Ok(status_report(&observed, desired))
    }
}

/// 조정기 빌더
pub struct ReconcilerBuilder<B: DockerBackend> {
    config: ReconcilerConfig,
    backend: Option<Arc<B>>,
}

impl<B: DockerBackend> ReconcilerBuilder<B> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ReconcilerConfig::default(),
            backend: None,
        }
    }

    /// 조정기 설정을 지정합니다.
    pub fn config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Docker 백엔드를 설정합니다.
    pub fn backend(mut self, backend: Arc<B>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// 조정기를 빌드합니다.
    pub fn build(self) -> Result<Reconciler<B>, ReconcileError> {
        self.config.validate()?;

        let backend = self.backend.ok_or_else(|| ReconcileError::Config {
            field: "backend".to_owned(),
            reason: "docker backend must be provided".to_owned(),
        })?;

        let dispatcher = Arc::new(TaskDispatcher::new(
            Arc::clone(&backend),
            self.config.marker.clone(),
            self.config.hash_label.clone(),
        ));
        let executor = PlanExecutor::new(
            dispatcher,
            self.config.task_timeout(),
            self.config.max_concurrent_tasks,
            self.config.on_failure,
        );

        Ok(Reconciler {
            config: self.config,
            backend,
            executor,
        })
    }
}

impl<B: DockerBackend> Default for ReconcilerBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}
