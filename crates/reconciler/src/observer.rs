//! 리소스 관측 -- 백엔드에서 네임스페이스에 속한 리소스 조회
//!
//! 모든 컨테이너와 네트워크를 조회한 뒤, 물리 이름이 접두사로 시작하고
//! 소유 표시 레이블이 일치하는 것만 남겨 [`ObservedState`]로 반환합니다.
//! 보고되는 이름에서는 접두사가 제거됩니다.

use tracing::debug;

use fleetform_core::types::ObservedState;

use crate::docker::{DockerBackend, ResourceSummary};
use crate::error::ReconcileError;

/// 백엔드의 현재 상태를 관측합니다.
///
/// `label_filter`가 `None`이면 레이블 필터 없이 접두사만으로 거릅니다.
/// 핑거프린트 레이블이 없는 컨테이너는 빈 문자열로 기록합니다.
/// 중복 이름은 그대로 보고하며, 처리는 플랜 생성 단계가 담당합니다.
pub async fn observe<B: DockerBackend>(
    backend: &B,
    prefix: &str,
    hash_label: &str,
    label_filter: Option<(&str, &str)>,
) -> Result<ObservedState, ReconcileError> {
    let (containers, networks) =
        tokio::try_join!(backend.list_containers(), backend.list_networks())?;

    let mut observed = ObservedState::new();
    for summary in containers {
        if let Some(name) = owned_name(&summary, prefix, label_filter) {
            let fingerprint = summary.label(hash_label).unwrap_or_default();
            observed = observed.with_container(name, fingerprint);
        }
    }
    for summary in networks {
        if let Some(name) = owned_name(&summary, prefix, label_filter) {
            observed = observed.with_network(name);
        }
    }

    debug!(
        containers = observed.containers.len(),
        networks = observed.networks.len(),
        "observed backend state"
    );
    Ok(observed)
}

/// 네임스페이스에 속하면 접두사를 뗀 논리 이름을 반환합니다.
fn owned_name<'a>(
    summary: &'a ResourceSummary,
    prefix: &str,
    label_filter: Option<(&str, &str)>,
) -> Option<&'a str> {
    let name = summary.name.trim_start_matches('/');
    let logical = name.strip_prefix(prefix)?;
    if let Some((key, value)) = label_filter {
        if summary.label(key) != Some(value) {
            return None;
        }
    }
    Some(logical)
}
