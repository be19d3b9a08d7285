//! 리소스별 동기화 상태 보고
//!
//! 관측 상태와 원하는 상태를 비교해 리소스마다 [`SyncState`]를 매깁니다.
//! 판단 기준은 [`compute_diff`]와 같으므로, 보고가 모두 `in-sync`이면 빈 플랜이 생성됩니다.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use fleetform_core::types::{DesiredMap, ObservedState};

use crate::fingerprint::fingerprint;
use crate::planner::compute_diff;

/// 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// 컨테이너
    Container,
    /// 네트워크
    Network,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// 동기화 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    /// 원하는 상태와 일치
    InSync,
    /// 존재하지만 재생성 필요 (핑거프린트 불일치 또는 중복)
    Drifted,
    /// 원하지만 존재하지 않음
    Missing,
    /// 존재하지만 원하지 않음
    Orphaned,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSync => write!(f, "in-sync"),
            Self::Drifted => write!(f, "drifted"),
            Self::Missing => write!(f, "missing"),
            Self::Orphaned => write!(f, "orphaned"),
        }
    }
}

/// 리소스 하나의 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    /// 종류
    pub kind: ResourceKind,
    /// 논리 이름
    pub name: String,
    /// 상태
    pub state: SyncState,
    /// 현재 명세의 핑거프린트 (원하는 컨테이너만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_fingerprint: Option<String>,
    /// 기록된 핑거프린트 (관측된 컨테이너만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_fingerprint: Option<String>,
}

/// 리소스별 상태를 계산합니다. 컨테이너가 먼저, 각 종류 안에서는 이름 순입니다.
pub fn status_report(observed: &ObservedState, desired: &DesiredMap) -> Vec<ResourceStatus> {
    let diff = compute_diff(observed, desired, &[], &[]);

    let classify = |name: &str, wanted: &[String], renew: &[String], seen: &HashSet<&str>| {
        let wanted = wanted.iter().any(|n| n == name);
        match (wanted, seen.contains(name)) {
            (true, true) if renew.iter().any(|n| n == name) => SyncState::Drifted,
            (true, true) => SyncState::InSync,
            (true, false) => SyncState::Missing,
            (false, _) => SyncState::Orphaned,
        }
    };

    let seen_containers: HashSet<&str> = observed.containers.iter().map(String::as_str).collect();
    let seen_networks: HashSet<&str> = observed.networks.iter().map(String::as_str).collect();

    let mut container_names: Vec<&str> = diff
        .desired_containers
        .iter()
        .map(String::as_str)
        .chain(seen_containers.iter().copied())
        .collect();
    container_names.sort_unstable();
    container_names.dedup();

    let mut network_names: Vec<&str> = diff
        .desired_networks
        .iter()
        .map(String::as_str)
        .chain(seen_networks.iter().copied())
        .collect();
    network_names.sort_unstable();
    network_names.dedup();

    let containers = container_names.into_iter().map(|name| ResourceStatus {
        kind: ResourceKind::Container,
        name: name.to_owned(),
        state: classify(
            name,
            &diff.desired_containers,
            &diff.renew_containers,
            &seen_containers,
        ),
        desired_fingerprint: desired
            .get(name)
            .filter(|plan| plan.enabled)
            .map(|plan| fingerprint(plan).into()),
        observed_fingerprint: observed.fingerprints.get(name).cloned(),
    });

    let networks = network_names.into_iter().map(|name| ResourceStatus {
        kind: ResourceKind::Network,
        name: name.to_owned(),
        state: classify(
            name,
            &diff.desired_networks,
            &diff.renew_networks,
            &seen_networks,
        ),
        desired_fingerprint: None,
        observed_fingerprint: None,
    });

    containers.chain(networks).collect()
}
