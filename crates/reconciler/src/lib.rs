//! # fleetform-reconciler
//!
//! Single-host desired-state reconciler for Docker containers and networks.
//!
//! 선언된 원하는 상태([`DesiredMap`](fleetform_core::DesiredMap))와 백엔드에서 관측한
//! 상태를 비교해, 실제 상태를 수렴시키는 스테이지별 태스크 목록([`Plan`])을 만들고 실행합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ReconcileError`)
//! - [`config`]: Reconciler configuration (`ReconcilerConfig`, builder)
//! - [`dedup`]: Order-preserving deduplication with duplicate reporting
//! - [`fingerprint`]: Canonical content hash of a `ResourcePlan`
//! - [`task`]: Task model (`Task`, `TaskKind`, `ParallelBatch`, `Plan`)
//! - [`docker`]: Docker API abstraction (`DockerBackend` trait, `BollardBackend`)
//! - [`observer`]: Observed-state query (`observe`)
//! - [`planner`]: Diff and staged plan generation (`generate_plan`)
//! - [`dispatcher`]: Single-task execution (`TaskDispatcher`)
//! - [`executor`]: Stage-by-stage plan execution (`PlanExecutor`, `ApplyReport`)
//! - [`status`]: Per-resource sync state (`status_report`)
//! - [`reconciler`]: One-shot reconcile cycle (`Reconciler`, `ReconcilerBuilder`)
//!
//! # Architecture
//!
//! ```text
//! DockerBackend --observe()--> ObservedState
//!                                   |
//!          DesiredMap + renew --> generate_plan()
//!                                   |
//!                                 Plan
//!                                   |
//!                      PlanExecutor (stage by stage)
//!                                   |
//!                  TaskDispatcher.dispatch() --> DockerBackend
//! ```

pub mod config;
pub mod dedup;
pub mod dispatcher;
pub mod docker;
pub mod error;
pub mod executor;
pub mod fingerprint;
pub mod observer;
pub mod planner;
pub mod reconciler;
pub mod status;
pub mod task;

// --- Public API Re-exports ---

// Reconcile cycle
pub use reconciler::{AppliedCycle, PlannedCycle, Reconciler, ReconcilerBuilder, RenewRequest};

// Configuration
pub use config::{ReconcilerConfig, ReconcilerConfigBuilder};

// Error
pub use error::ReconcileError;

// Core algorithm
pub use dedup::{dedup, dedup_with, partition_duplicates};
pub use fingerprint::{Fingerprint, fingerprint};
pub use observer::observe;
pub use planner::{
    PlanOptions, ResourceDiff, build_plan, compute_diff, generate_plan, generate_plan_with,
};
pub use task::{ParallelBatch, Plan, Task, TaskKind};

// Docker API
pub use docker::{BollardBackend, DockerBackend, Labels, ResourceSummary};

// Execution
pub use dispatcher::TaskDispatcher;
pub use executor::{ApplyReport, PlanExecutor, StageReport, TaskOutcome, TaskStatus};

// Status
pub use status::{ResourceKind, ResourceStatus, SyncState, status_report};
