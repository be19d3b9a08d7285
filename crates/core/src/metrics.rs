//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `fleetform_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 태스크 종류 레이블 키 (image.pull, container.create, ...)
pub const LABEL_KIND: &str = "kind";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 조정기 메트릭 ──────────────────────────────────────────────────

/// 실행된 태스크 수 (counter, label: kind, result)
pub const TASKS_EXECUTED_TOTAL: &str = "fleetform_tasks_executed_total";

/// 실행된 스테이지 수 (counter)
pub const STAGES_EXECUTED_TOTAL: &str = "fleetform_stages_executed_total";

/// 완료된 조정 사이클 수 (counter)
pub const RECONCILE_CYCLES_TOTAL: &str = "fleetform_reconcile_cycles_total";

/// 마지막으로 생성된 플랜의 태스크 수 (gauge)
pub const PLAN_TASKS: &str = "fleetform_plan_tasks";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        TASKS_EXECUTED_TOTAL,
        "Tasks dispatched to the container backend, by kind and result"
    );
    describe_counter!(
        STAGES_EXECUTED_TOTAL,
        "Plan stages attempted by the executor"
    );
    describe_counter!(
        RECONCILE_CYCLES_TOTAL,
        "Completed observe/plan/apply cycles"
    );
    describe_gauge!(PLAN_TASKS, "Number of tasks in the most recent plan");
}
