//! 차이 계산 및 스테이지별 플랜 생성
//!
//! 관측 상태, 원하는 상태, 호출자가 지정한 강제 재생성 목록을 받아
//! 실제 상태를 원하는 상태로 수렴시키는 [`Plan`]을 만듭니다.
//! 이 모듈의 함수는 모두 순수 함수입니다. I/O가 없고 입력을 변경하지 않습니다.
//!
//! # 스테이지 순서
//!
//! ```text
//! [pull image]...            이미지마다 한 스테이지 (batch_image_pulls면 하나로 묶음)
//! [delete container...]      삭제 대상 컨테이너 전체
//! [delete network...]        삭제 대상 네트워크 전체
//! [create network... + create container...]
//! [detach container...]      원하는 컨테이너 전체
//! [attach network...]...     컨테이너마다 한 스테이지 (batch_network_attach면 하나로 묶음)
//! [start container...]       생성한 컨테이너 전체
//! ```
//!
//! 같은 이름의 삭제는 항상 생성보다 앞선 스테이지에 놓이므로 재생성이 경쟁하지 않습니다.
//! 빈 스테이지는 플랜에 포함되지 않습니다.

use std::collections::HashSet;

use serde::Serialize;

use fleetform_core::types::{DesiredMap, ObservedState};

use crate::dedup::{dedup, partition_duplicates};
use crate::fingerprint::fingerprint;
use crate::task::{Plan, Task};

/// 플랜 생성 옵션
///
/// 기본값은 이미지 풀과 네트워크 연결을 이름마다 별도 스테이지로 순차 실행합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// 모든 이미지 풀을 하나의 병렬 스테이지로 묶음
    pub batch_image_pulls: bool,
    /// 모든 네트워크 연결을 하나의 병렬 스테이지로 묶음
    pub batch_network_attach: bool,
}

/// 관측 상태와 원하는 상태의 차이 (논리 이름)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceDiff {
    /// 원하는 컨테이너 (활성화된 것만, 이름 순)
    pub desired_containers: Vec<String>,
    /// 원하는 컨테이너가 참조하는 네트워크 (첫 참조 순)
    pub desired_networks: Vec<String>,
    /// 강제 재생성할 컨테이너 (중복 관측, 핑거프린트 불일치, 호출자 지정)
    pub renew_containers: Vec<String>,
    /// 강제 재생성할 네트워크 (중복 관측, 호출자 지정)
    pub renew_networks: Vec<String>,
    /// 삭제할 컨테이너
    pub delete_containers: Vec<String>,
    /// 삭제할 네트워크
    pub delete_networks: Vec<String>,
    /// 생성할 컨테이너
    pub create_containers: Vec<String>,
    /// 생성할 네트워크
    pub create_networks: Vec<String>,
    /// 생성할 컨테이너에 필요한 이미지 (`image:tag`)
    pub images: Vec<String>,
}

impl ResourceDiff {
    /// 변경할 것이 없는지 확인합니다.
    pub fn is_converged(&self) -> bool {
        self.delete_containers.is_empty()
            && self.delete_networks.is_empty()
            && self.create_containers.is_empty()
            && self.create_networks.is_empty()
    }
}

/// 관측 상태와 원하는 상태의 차이를 계산합니다.
///
/// 관측 목록의 중복은 강제 재생성 대상으로 처리합니다.
/// 관측된 컨테이너의 기록된 핑거프린트가 현재 명세와 다르면 역시 재생성 대상입니다.
/// 원하는 상태에 없는 재생성 대상은 삭제만 하고 다시 만들지 않습니다.
pub fn compute_diff(
    observed: &ObservedState,
    desired: &DesiredMap,
    renew_containers: &[String],
    renew_networks: &[String],
) -> ResourceDiff {
    let (observed_containers, duplicate_containers) =
        partition_duplicates(observed.containers.iter().map(String::as_str));
    let (observed_networks, duplicate_networks) =
        partition_duplicates(observed.networks.iter().map(String::as_str));

    let desired_containers = dedup(
        desired
            .iter()
            .filter(|(_, plan)| plan.enabled)
            .map(|(name, _)| name.as_str()),
    );
    let desired_networks = dedup(
        desired_containers
            .iter()
            .filter_map(|name| desired.get(name))
            .flat_map(|plan| plan.networks.iter().map(String::as_str)),
    );

    let observed_container_set: HashSet<&str> =
        observed_containers.iter().map(String::as_str).collect();
    let observed_network_set: HashSet<&str> =
        observed_networks.iter().map(String::as_str).collect();
    let desired_container_set: HashSet<&str> =
        desired_containers.iter().map(String::as_str).collect();
    let desired_network_set: HashSet<&str> =
        desired_networks.iter().map(String::as_str).collect();

    let drifted = desired_containers.iter().filter(|name| {
        observed_container_set.contains(name.as_str())
            && desired.get(name.as_str()).is_some_and(|plan| {
                !fingerprint(plan).matches(observed.fingerprint_of(name))
            })
    });

    let renew_containers = dedup(
        renew_containers
            .iter()
            .chain(duplicate_containers.iter())
            .chain(drifted)
            .map(String::as_str),
    );
    let renew_networks = dedup(
        renew_networks
            .iter()
            .chain(duplicate_networks.iter())
            .map(String::as_str),
    );

    let delete_containers = union(
        observed_containers
            .iter()
            .filter(|name| !desired_container_set.contains(name.as_str())),
        &renew_containers,
    );
    let delete_networks = union(
        observed_networks
            .iter()
            .filter(|name| !desired_network_set.contains(name.as_str())),
        &renew_networks,
    );
    let create_containers = union(
        desired_containers
            .iter()
            .filter(|name| !observed_container_set.contains(name.as_str())),
        &renew_containers
            .iter()
            .filter(|name| desired_container_set.contains(name.as_str()))
            .cloned()
            .collect::<Vec<_>>(),
    );
    let create_networks = union(
        desired_networks
            .iter()
            .filter(|name| !observed_network_set.contains(name.as_str())),
        &renew_networks
            .iter()
            .filter(|name| desired_network_set.contains(name.as_str()))
            .cloned()
            .collect::<Vec<_>>(),
    );

    let images = dedup(
        create_containers
            .iter()
            .filter_map(|name| desired.get(name))
            .map(|plan| plan.image_ref()),
    );

    ResourceDiff {
        desired_containers,
        desired_networks,
        renew_containers,
        renew_networks,
        delete_containers,
        delete_networks,
        create_containers,
        create_networks,
        images,
    }
}

/// 기준 목록 뒤에 아직 없는 추가 항목을 붙입니다.
fn union<'a, I>(base: I, extra: &'a [String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    dedup(base.into_iter().chain(extra.iter()).map(String::as_str))
}

/// 차이로부터 스테이지별 플랜을 만듭니다.
///
/// `desired`는 `diff`를 계산할 때 사용한 것과 같아야 합니다.
/// 생성도 삭제도 없는 차이는 분리/연결 스테이지 없이 빈 플랜이 됩니다.
pub fn build_plan(
    diff: &ResourceDiff,
    desired: &DesiredMap,
    prefix: &str,
    options: PlanOptions,
) -> Plan {
    let mut plan = Plan::new();
    if diff.is_converged() {
        return plan;
    }

    let physical = |name: &str| format!("{prefix}{name}");

    let pulls: Vec<Task> = diff
        .images
        .iter()
        .map(|image| Task::PullImage {
            image: image.clone(),
        })
        .collect();
    if options.batch_image_pulls {
        plan.push_stage(pulls);
    } else {
        for pull in pulls {
            plan.push_stage(vec![pull]);
        }
    }

    plan.push_stage(
        diff.delete_containers
            .iter()
            .map(|name| Task::DeleteContainer {
                name: physical(name),
            })
            .collect(),
    );

    plan.push_stage(
        diff.delete_networks
            .iter()
            .map(|name| Task::DeleteNetwork {
                name: physical(name),
            })
            .collect(),
    );

    let create_networks = diff.create_networks.iter().map(|name| Task::CreateNetwork {
        name: physical(name),
    });
    let create_containers = diff.create_containers.iter().filter_map(|name| {
        desired.get(name).map(|spec| Task::CreateContainer {
            name: physical(name),
            plan: spec.clone(),
        })
    });
    plan.push_stage(create_networks.chain(create_containers).collect());

    plan.push_stage(
        diff.desired_containers
            .iter()
            .map(|name| Task::DetachContainer {
                name: physical(name),
            })
            .collect(),
    );

    let attach_stages: Vec<Vec<Task>> = diff
        .desired_containers
        .iter()
        .filter_map(|name| desired.get(name).map(|spec| (name, spec)))
        .map(|(name, spec)| {
            dedup(spec.networks.iter().map(String::as_str))
                .into_iter()
                .map(|network| Task::AttachNetwork {
                    network: physical(&network),
                    container: physical(name),
                })
                .collect()
        })
        .collect();
    if options.batch_network_attach {
        plan.push_stage(attach_stages.into_iter().flatten().collect());
    } else {
        for stage in attach_stages {
            plan.push_stage(stage);
        }
    }

    plan.push_stage(
        diff.create_containers
            .iter()
            .filter(|name| desired.contains_key(name.as_str()))
            .map(|name| Task::StartContainer {
                name: physical(name),
            })
            .collect(),
    );

    plan
}

/// 기본 옵션으로 플랜을 생성합니다.
pub fn generate_plan(
    observed: &ObservedState,
    desired: &DesiredMap,
    renew_containers: &[String],
    renew_networks: &[String],
    prefix: &str,
) -> Plan {
    generate_plan_with(
        observed,
        desired,
        renew_containers,
        renew_networks,
        prefix,
        PlanOptions::default(),
    )
}

/// 주어진 옵션으로 플랜을 생성합니다.
pub fn generate_plan_with(
    observed: &ObservedState,
    desired: &DesiredMap,
    renew_containers: &[String],
    renew_networks: &[String],
    prefix: &str,
    options: PlanOptions,
) -> Plan {
    let diff = compute_diff(observed, desired, renew_containers, renew_networks);
    build_plan(&diff, desired, prefix, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use fleetform_core::types::ResourcePlan;

    const PREFIX: &str = "ff_";

    fn web_desired() -> DesiredMap {
        let mut desired = DesiredMap::new();
        desired.insert(
            "web".to_owned(),
            ResourcePlan::new("nginx").with_networks(["net1"]),
        );
        desired
    }

    fn in_sync(desired: &DesiredMap) -> ObservedState {
        let mut observed = ObservedState::new();
        for (name, plan) in desired.iter().filter(|(_, p)| p.enabled) {
            observed = observed.with_container(name.as_str(), fingerprint(plan).to_string());
            for network in &plan.networks {
                if !observed.networks.contains(network) {
                    observed = observed.with_network(network.as_str());
                }
            }
        }
        observed
    }

    fn stage_strings(plan: &Plan) -> Vec<Vec<String>> {
        plan.stages()
            .iter()
            .map(|s| s.tasks().iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn fresh_deploy() {
        let plan = generate_plan(&ObservedState::new(), &web_desired(), &[], &[], PREFIX);
        assert_eq!(
            stage_strings(&plan),
            vec![
                vec!["image.pull nginx:latest"],
                vec!["network.create ff_net1", "container.create ff_web"],
                vec!["container.detach ff_web"],
                vec!["network.attach ff_net1 -> ff_web"],
                vec!["container.start ff_web"],
            ]
        );
    }

    #[test]
    fn drift_triggers_full_renew() {
        let observed = ObservedState::new()
            .with_container("web", "stale")
            .with_network("net1");
        let plan = generate_plan(&observed, &web_desired(), &[], &[], PREFIX);
        assert_eq!(
            stage_strings(&plan),
            vec![
                vec!["image.pull nginx:latest"],
                vec!["container.delete ff_web"],
                vec!["container.create ff_web"],
                vec!["container.detach ff_web"],
                vec!["network.attach ff_net1 -> ff_web"],
                vec!["container.start ff_web"],
            ]
        );
        assert_eq!(plan.stage_of(TaskKind::CreateNetwork, "ff_net1"), None);
        assert_eq!(plan.stage_of(TaskKind::DeleteNetwork, "ff_net1"), None);
    }

    #[test]
    fn disabling_deletes_container_and_unused_network() {
        let desired = web_desired();
        let observed = in_sync(&desired);
        let mut disabled = desired.clone();
        if let Some(web) = disabled.get_mut("web") {
            web.enabled = false;
        }

        let plan = generate_plan(&observed, &disabled, &[], &[], PREFIX);
        assert_eq!(
            stage_strings(&plan),
            vec![
                vec!["container.delete ff_web"],
                vec!["network.delete ff_net1"],
            ]
        );
    }

    #[test]
    fn disabling_keeps_network_used_by_other_container() {
        let mut desired = web_desired();
        desired.insert(
            "api".to_owned(),
            ResourcePlan::new("api").with_networks(["net1"]),
        );
        let observed = in_sync(&desired);
        if let Some(web) = desired.get_mut("web") {
            web.enabled = false;
        }

        let plan = generate_plan(&observed, &desired, &[], &[], PREFIX);
        assert_eq!(plan.stage_of(TaskKind::DeleteContainer, "ff_web"), Some(0));
        assert_eq!(plan.stage_of(TaskKind::DeleteNetwork, "ff_net1"), None);
        assert_eq!(plan.stage_of(TaskKind::CreateContainer, "ff_web"), None);
        assert_eq!(plan.stage_of(TaskKind::StartContainer, "ff_web"), None);
    }

    #[test]
    fn converged_state_yields_empty_plan() {
        let mut desired = web_desired();
        desired.insert(
            "db".to_owned(),
            ResourcePlan::new("postgres")
                .with_tag("16")
                .with_networks(["net2"]),
        );
        let observed = in_sync(&desired);

        let diff = compute_diff(&observed, &desired, &[], &[]);
        assert!(diff.is_converged());
        assert!(generate_plan(&observed, &desired, &[], &[], PREFIX).is_empty());
    }

    #[test]
    fn empty_everything_yields_empty_plan() {
        let plan = generate_plan(&ObservedState::new(), &DesiredMap::new(), &[], &[], PREFIX);
        assert!(plan.is_empty());
    }

    #[test]
    fn duplicate_observed_container_is_renewed() {
        let desired = web_desired();
        let mut observed = in_sync(&desired);
        observed.containers.push("web".to_owned());

        let diff = compute_diff(&observed, &desired, &[], &[]);
        assert_eq!(diff.renew_containers, vec!["web"]);
        assert_eq!(diff.delete_containers, vec!["web"]);
        assert_eq!(diff.create_containers, vec!["web"]);
    }

    #[test]
    fn duplicate_observed_network_is_renewed() {
        let desired = web_desired();
        let mut observed = in_sync(&desired);
        observed.networks.push("net1".to_owned());

        let plan = generate_plan(&observed, &desired, &[], &[], PREFIX);
        let delete = plan.stage_of(TaskKind::DeleteNetwork, "ff_net1").unwrap();
        let create = plan.stage_of(TaskKind::CreateNetwork, "ff_net1").unwrap();
        assert!(delete < create);
        // 컨테이너는 변경 없으므로 재생성하지 않음
        assert_eq!(plan.stage_of(TaskKind::CreateContainer, "ff_web"), None);
        // 모든 원하는 컨테이너는 다시 연결됨
        assert!(plan.stage_of(TaskKind::AttachNetwork, "ff_net1").is_some());
    }

    #[test]
    fn forced_renew_recreates_unchanged_container() {
        let desired = web_desired();
        let observed = in_sync(&desired);

        let plan = generate_plan(&observed, &desired, &["web".to_owned()], &[], PREFIX);
        let delete = plan.stage_of(TaskKind::DeleteContainer, "ff_web").unwrap();
        let create = plan.stage_of(TaskKind::CreateContainer, "ff_web").unwrap();
        let start = plan.stage_of(TaskKind::StartContainer, "ff_web").unwrap();
        assert!(delete < create);
        assert!(create < start);
        assert!(plan.stage_of(TaskKind::PullImage, "nginx:latest").is_some());
    }

    #[test]
    fn forced_renew_of_undesired_name_only_deletes() {
        let desired = web_desired();
        let observed = in_sync(&desired);

        let diff = compute_diff(
            &observed,
            &desired,
            &["ghost".to_owned()],
            &["oldnet".to_owned()],
        );
        assert_eq!(diff.delete_containers, vec!["ghost"]);
        assert_eq!(diff.delete_networks, vec!["oldnet"]);
        assert!(diff.create_containers.is_empty());
        assert!(diff.create_networks.is_empty());
    }

    #[test]
    fn renew_lists_are_deduplicated() {
        let desired = web_desired();
        let observed = ObservedState::new()
            .with_container("web", "stale")
            .with_container("web", "stale")
            .with_network("net1");

        let diff = compute_diff(&observed, &desired, &["web".to_owned(), "web".to_owned()], &[]);
        assert_eq!(diff.renew_containers, vec!["web"]);
        assert_eq!(diff.delete_containers, vec!["web"]);
    }

    #[test]
    fn container_without_recorded_fingerprint_is_renewed() {
        let desired = web_desired();
        let observed = ObservedState {
            containers: vec!["web".to_owned()],
            networks: vec!["net1".to_owned()],
            fingerprints: Default::default(),
        };
        let diff = compute_diff(&observed, &desired, &[], &[]);
        assert_eq!(diff.renew_containers, vec!["web"]);
    }

    #[test]
    fn orphan_container_and_network_are_deleted() {
        let desired = web_desired();
        let observed = in_sync(&desired)
            .with_container("old", "whatever")
            .with_network("oldnet");

        let plan = generate_plan(&observed, &desired, &[], &[], PREFIX);
        assert_eq!(
            stage_strings(&plan),
            vec![
                vec!["container.delete ff_old"],
                vec!["network.delete ff_oldnet"],
                vec!["container.detach ff_web"],
                vec!["network.attach ff_net1 -> ff_web"],
            ]
        );
    }

    #[test]
    fn images_are_pulled_once_each_in_own_stage() {
        let mut desired = DesiredMap::new();
        desired.insert("a".to_owned(), ResourcePlan::new("nginx"));
        desired.insert("b".to_owned(), ResourcePlan::new("nginx"));
        desired.insert("c".to_owned(), ResourcePlan::new("redis").with_tag("7"));

        let plan = generate_plan(&ObservedState::new(), &desired, &[], &[], PREFIX);
        let stages = stage_strings(&plan);
        assert_eq!(stages[0], vec!["image.pull nginx:latest"]);
        assert_eq!(stages[1], vec!["image.pull redis:7"]);
        assert_eq!(
            plan.tasks()
                .filter(|t| t.kind() == TaskKind::PullImage)
                .count(),
            2
        );
    }

    #[test]
    fn batched_pulls_share_one_stage() {
        let mut desired = DesiredMap::new();
        desired.insert("a".to_owned(), ResourcePlan::new("nginx"));
        desired.insert("b".to_owned(), ResourcePlan::new("redis"));

        let options = PlanOptions {
            batch_image_pulls: true,
            ..Default::default()
        };
        let plan = generate_plan_with(&ObservedState::new(), &desired, &[], &[], PREFIX, options);
        assert_eq!(
            stage_strings(&plan)[0],
            vec!["image.pull nginx:latest", "image.pull redis:latest"]
        );
    }

    #[test]
    fn attach_stage_per_container_by_default() {
        let mut desired = DesiredMap::new();
        desired.insert(
            "a".to_owned(),
            ResourcePlan::new("nginx").with_networks(["n1", "n2"]),
        );
        desired.insert("b".to_owned(), ResourcePlan::new("nginx").with_networks(["n1"]));
        let observed = in_sync(&desired);

        let plan = generate_plan(&observed, &desired, &["a".to_owned(), "b".to_owned()], &[], PREFIX);
        let stages = stage_strings(&plan);
        assert!(stages.contains(&vec![
            "network.attach ff_n1 -> ff_a".to_owned(),
            "network.attach ff_n2 -> ff_a".to_owned(),
        ]));
        assert!(stages.contains(&vec!["network.attach ff_n1 -> ff_b".to_owned()]));
    }

    #[test]
    fn batched_attach_shares_one_stage() {
        let mut desired = DesiredMap::new();
        desired.insert("a".to_owned(), ResourcePlan::new("nginx").with_networks(["n1"]));
        desired.insert("b".to_owned(), ResourcePlan::new("nginx").with_networks(["n1"]));

        let options = PlanOptions {
            batch_network_attach: true,
            ..Default::default()
        };
        let plan = generate_plan_with(&ObservedState::new(), &desired, &[], &[], PREFIX, options);
        let stages = stage_strings(&plan);
        assert!(stages.contains(&vec![
            "network.attach ff_n1 -> ff_a".to_owned(),
            "network.attach ff_n1 -> ff_b".to_owned(),
        ]));
    }

    #[test]
    fn detach_covers_every_desired_container() {
        let mut desired = web_desired();
        desired.insert("api".to_owned(), ResourcePlan::new("api").with_networks(["net1"]));
        let mut observed = in_sync(&desired);
        // web만 새로 만들어야 하는 상황
        observed.containers.retain(|c| c != "web");

        let plan = generate_plan(&observed, &desired, &[], &[], PREFIX);
        let detach = plan.stage_of(TaskKind::DetachContainer, "ff_web").unwrap();
        assert_eq!(plan.stage_of(TaskKind::DetachContainer, "ff_api"), Some(detach));
        assert_eq!(plan.stage_of(TaskKind::StartContainer, "ff_api"), None);
        assert!(plan.stage_of(TaskKind::StartContainer, "ff_web").is_some());
    }

    #[test]
    fn duplicate_declared_networks_attach_once() {
        let mut desired = DesiredMap::new();
        desired.insert(
            "web".to_owned(),
            ResourcePlan::new("nginx").with_networks(["net1", "net1"]),
        );
        let plan = generate_plan(&ObservedState::new(), &desired, &[], &[], PREFIX);
        assert_eq!(
            plan.tasks()
                .filter(|t| t.kind() == TaskKind::AttachNetwork)
                .count(),
            1
        );
        assert_eq!(
            plan.tasks()
                .filter(|t| t.kind() == TaskKind::CreateNetwork)
                .count(),
            1
        );
    }

    #[test]
    fn every_delete_precedes_create_of_same_name() {
        let mut desired = web_desired();
        desired.insert("db".to_owned(), ResourcePlan::new("postgres").with_networks(["net2"]));
        let observed = ObservedState::new()
            .with_container("web", "stale")
            .with_container("db", "stale")
            .with_container("db", "stale")
            .with_network("net2")
            .with_network("net2");

        let plan = generate_plan(&observed, &desired, &[], &["net1".to_owned()], PREFIX);
        for task in plan.tasks() {
            let (delete_kind, create_kind) = match task.kind() {
                TaskKind::DeleteContainer => (TaskKind::DeleteContainer, TaskKind::CreateContainer),
                TaskKind::DeleteNetwork => (TaskKind::DeleteNetwork, TaskKind::CreateNetwork),
                _ => continue,
            };
            let delete = plan.stage_of(delete_kind, task.name()).unwrap();
            if let Some(create) = plan.stage_of(create_kind, task.name()) {
                assert!(delete < create, "{task} must precede its create");
            }
        }
    }

    #[test]
    fn no_stage_repeats_a_task() {
        let mut desired = web_desired();
        desired.insert("api".to_owned(), ResourcePlan::new("api").with_networks(["net1", "net2"]));
        let observed = ObservedState::new()
            .with_container("web", "stale")
            .with_container("web", "stale")
            .with_network("net1")
            .with_network("net1");

        let plan = generate_plan(
            &observed,
            &desired,
            &["web".to_owned(), "api".to_owned()],
            &["net1".to_owned()],
            PREFIX,
        );
        for stage in plan.stages() {
            let mut seen = HashSet::new();
            for task in stage.tasks() {
                let key = (task.kind(), task.name().to_owned(), task.target().map(str::to_owned));
                assert!(seen.insert(key), "duplicate task {task} in one stage");
            }
        }
    }

    #[test]
    fn prefix_is_applied_to_every_resource_name() {
        let plan = generate_plan(&ObservedState::new(), &web_desired(), &[], &[], "stage_");
        for task in plan.tasks() {
            if task.kind() != TaskKind::PullImage {
                assert!(task.name().starts_with("stage_"), "{task}");
            }
        }
    }

    #[test]
    fn inputs_are_not_mutated() {
        let desired = web_desired();
        let observed = ObservedState::new()
            .with_container("web", "stale")
            .with_container("web", "stale");
        let renew = vec!["web".to_owned()];
        let before = (observed.clone(), desired.clone(), renew.clone());

        let _ = generate_plan(&observed, &desired, &renew, &[], PREFIX);
        assert_eq!((observed, desired, renew), before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const CONTAINERS: &[&str] = &["a", "b", "c", "d"];
        const NETWORKS: &[&str] = &["n1", "n2", "n3"];
        const IMAGES: &[&str] = &["nginx", "postgres"];

        fn container_name() -> impl Strategy<Value = String> {
            prop::sample::select(CONTAINERS).prop_map(str::to_owned)
        }

        fn network_name() -> impl Strategy<Value = String> {
            prop::sample::select(NETWORKS).prop_map(str::to_owned)
        }

        fn resource_plan() -> impl Strategy<Value = ResourcePlan> {
            (
                prop::sample::select(IMAGES),
                any::<bool>(),
                prop::collection::vec(network_name(), 0..4),
            )
                .prop_map(|(image, enabled, networks)| {
                    ResourcePlan::new(image)
                        .with_enabled(enabled)
                        .with_networks(networks)
                })
        }

        fn desired_map() -> impl Strategy<Value = DesiredMap> {
            prop::collection::btree_map(container_name(), resource_plan(), 0..5)
        }

        fn options() -> impl Strategy<Value = PlanOptions> {
            (any::<bool>(), any::<bool>()).prop_map(|(pulls, attach)| PlanOptions {
                batch_image_pulls: pulls,
                batch_network_attach: attach,
            })
        }

        /// 관측 컨테이너마다 현재 명세의 핑거프린트를 기록할지 여부를 함께 뽑음
        fn observed_for(
            desired: &DesiredMap,
            containers: &[(String, bool)],
            networks: &[String],
        ) -> ObservedState {
            let mut observed = ObservedState::new();
            for (name, current) in containers {
                let recorded = match desired.get(name) {
                    Some(plan) if *current => fingerprint(plan).to_string(),
                    _ => "stale".to_owned(),
                };
                observed = observed.with_container(name.as_str(), recorded);
            }
            for network in networks {
                observed = observed.with_network(network.as_str());
            }
            observed
        }

        proptest! {
            #[test]
            fn deletes_always_precede_creates(
                desired in desired_map(),
                containers in prop::collection::vec((container_name(), any::<bool>()), 0..6),
                networks in prop::collection::vec(network_name(), 0..5),
                renew_containers in prop::collection::vec(container_name(), 0..3),
                renew_networks in prop::collection::vec(network_name(), 0..3),
                opts in options(),
            ) {
                let observed = observed_for(&desired, &containers, &networks);
                let plan = generate_plan_with(
                    &observed,
                    &desired,
                    &renew_containers,
                    &renew_networks,
                    PREFIX,
                    opts,
                );

                for task in plan.tasks() {
                    let create_kind = match task.kind() {
                        TaskKind::DeleteContainer => TaskKind::CreateContainer,
                        TaskKind::DeleteNetwork => TaskKind::CreateNetwork,
                        _ => continue,
                    };
                    let delete = plan.stage_of(task.kind(), task.name());
                    prop_assert!(delete.is_some());
                    if let (Some(delete), Some(create)) =
                        (delete, plan.stage_of(create_kind, task.name()))
                    {
                        prop_assert!(delete < create, "{} must precede its create", task);
                    }
                }
            }

            #[test]
            fn converged_image_of_desired_plans_nothing(
                desired in desired_map(),
                opts in options(),
            ) {
                let observed = in_sync(&desired);
                let plan = generate_plan_with(&observed, &desired, &[], &[], PREFIX, opts);
                prop_assert!(plan.is_empty(), "unexpected plan: {:?}", stage_strings(&plan));
            }
        }
    }
}
