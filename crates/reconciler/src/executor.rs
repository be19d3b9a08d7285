//! 플랜 실행 -- 스테이지 순차, 스테이지 내 병렬
//!
//! [`PlanExecutor`]는 [`Plan`]의 스테이지를 순서대로 실행합니다.
//! 한 스테이지의 태스크는 [`JoinSet`]에서 동시에 실행되며, 세마포어로 동시 실행 수를
//! 제한하고 태스크마다 타임아웃을 적용합니다. 다음 스테이지는 이전 스테이지의
//! 모든 태스크가 끝난 뒤에 시작합니다.
//!
//! 실패한 태스크는 재시도하지 않습니다. 남은 차이는 다음 조정 주기에서 다시 계산됩니다.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use fleetform_core::config::FailurePolicy;
use fleetform_core::metrics as m;

use crate::dispatcher::TaskDispatcher;
use crate::docker::DockerBackend;
use crate::error::ReconcileError;
use crate::task::{Plan, Task, TaskKind};

/// 태스크 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 성공
    Succeeded,
    /// 실패
    Failed,
}

/// 태스크 하나의 실행 기록
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    /// 실행한 태스크
    pub task: Task,
    /// 결과
    pub status: TaskStatus,
    /// 실패 시 에러 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 소요 시간 (밀리초)
    pub elapsed_ms: u64,
}

impl TaskOutcome {
    /// 성공 여부
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

/// 스테이지 하나의 실행 기록
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// 플랜 내 스테이지 번호 (0부터)
    pub index: usize,
    /// 태스크별 결과 (플랜에 적힌 순서)
    pub outcomes: Vec<TaskOutcome>,
}

impl StageReport {
    /// 성공한 태스크 수
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// 실패한 태스크 수
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// 실패한 태스크 결과
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// 플랜 실행 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// 실행한 스테이지 기록
    pub stages: Vec<StageReport>,
    /// 실패로 인해 실행하지 않은 스테이지 수
    pub skipped_stages: usize,
}

impl ApplyReport {
    /// 모든 태스크가 성공했는지 확인합니다.
    pub fn is_success(&self) -> bool {
        self.skipped_stages == 0 && self.stages.iter().all(|s| s.failed() == 0)
    }

    /// 성공한 태스크 수
    pub fn succeeded(&self) -> usize {
        self.stages.iter().map(StageReport::succeeded).sum()
    }

    /// 실패한 태스크 수
    pub fn failed(&self) -> usize {
        self.stages.iter().map(StageReport::failed).sum()
    }

    /// 실패한 태스크 결과
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.stages.iter().flat_map(StageReport::failures)
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} stage(s) skipped",
            self.succeeded(),
            self.failed(),
            self.skipped_stages
        )
    }
}

/// 플랜 실행기
pub struct PlanExecutor<B: DockerBackend> {
    /// 태스크 디스패처
    dispatcher: Arc<TaskDispatcher<B>>,
    /// 태스크 타임아웃
    task_timeout: Duration,
    /// 스테이지 내 동시 실행 제한
    max_concurrent: usize,
    /// 실패 정책
    on_failure: FailurePolicy,
}

impl<B: DockerBackend> PlanExecutor<B> {
    /// 새 실행기를 생성합니다.
    pub fn new(
        dispatcher: Arc<TaskDispatcher<B>>,
        task_timeout: Duration,
        max_concurrent: usize,
        on_failure: FailurePolicy,
    ) -> Self {
        Self {
            dispatcher,
            task_timeout,
            max_concurrent: max_concurrent.max(1),
            on_failure,
        }
    }

    /// 플랜을 실행합니다.
    ///
    /// 태스크 실패는 에러가 아니라 [`ApplyReport`]에 기록됩니다.
    pub async fn execute(&self, plan: &Plan) -> ApplyReport {
        let mut report = ApplyReport::default();
        let total = plan.len();

        for (index, stage) in plan.stages().iter().enumerate() {
            let stage_report = self.run_stage(index, stage.tasks()).await;
            metrics::counter!(m::STAGES_EXECUTED_TOTAL).increment(1);

            let failed = stage_report.failed();
            report.stages.push(stage_report);

            if failed > 0 && self.on_failure == FailurePolicy::Abort {
                report.skipped_stages = total - index - 1;
                if report.skipped_stages > 0 {
                    warn!(
                        stage = index,
                        failed,
                        skipped = report.skipped_stages,
                        "stage failed, aborting remaining stages"
                    );
                }
                break;
            }
        }

        report
    }

    async fn run_stage(&self, index: usize, tasks: &[Task]) -> StageReport {
        info!(stage = index, tasks = tasks.len(), "running stage");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut set = JoinSet::new();

        for (slot, task) in tasks.iter().enumerate() {
            let dispatcher = Arc::clone(&self.dispatcher);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.task_timeout;
            let task = task.clone();

            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let started = Instant::now();
                let result = match tokio::time::timeout(timeout, dispatcher.dispatch(&task)).await
                {
                    Ok(result) => result,
                    Err(_elapsed) => Err(ReconcileError::TaskTimeout {
                        task: task.to_string(),
                        timeout_secs: timeout.as_secs(),
                    }),
                };
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                (slot, result, elapsed_ms)
            });
        }

        let mut outcomes: Vec<TaskOutcome> = tasks
            .iter()
            .map(|task| TaskOutcome {
                task: task.clone(),
                status: TaskStatus::Failed,
                error: Some("task did not complete".to_owned()),
                elapsed_ms: 0,
            })
            .collect();

        while let Some(joined) = set.join_next().await {
            let (slot, result, elapsed_ms) = match joined {
                Ok(done) => done,
                Err(e) => {
                    error!(stage = index, error = %e, "task join failed");
                    continue;
                }
            };
            let Some(outcome) = outcomes.get_mut(slot) else {
                continue;
            };
            outcome.elapsed_ms = elapsed_ms;
            match result {
                Ok(()) => {
                    info!(stage = index, task = %outcome.task, elapsed_ms, "task succeeded");
                    outcome.status = TaskStatus::Succeeded;
                    outcome.error = None;
                }
                Err(e) => {
                    error!(stage = index, task = %outcome.task, error = %e, "task failed");
                    outcome.error = Some(e.to_string());
                }
            }
        }

        for outcome in &outcomes {
            record_task_metric(outcome.task.kind(), outcome.is_success());
        }

        StageReport { index, outcomes }
    }
}

fn record_task_metric(kind: TaskKind, success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!(
        m::TASKS_EXECUTED_TOTAL,
        m::LABEL_KIND => kind.as_str(),
        m::LABEL_RESULT => result
    )
    .increment(1);
}
