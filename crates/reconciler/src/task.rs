//! 태스크 모델 -- 태스크, 병렬 배치, 플랜
//!
//! [`Task`]는 백엔드 호출 하나에 대응하는 자기 완결적인 작업 단위입니다.
//! [`ParallelBatch`]는 서로 다른 리소스를 대상으로 하는 태스크 묶음으로 동시에 실행해도 안전하고,
//! [`Plan`]은 배치의 순서 있는 목록입니다. 배치 i+1은 배치 i가 끝난 뒤에 실행됩니다.
//!
//! JSON 직렬화 시 태스크는 `type` 필드(`image.pull`, `container.create`, ...)로 구분됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use fleetform_core::types::ResourcePlan;

/// 태스크 종류 (닫힌 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "image.pull")]
    PullImage,
    #[serde(rename = "container.create")]
    CreateContainer,
    #[serde(rename = "container.start")]
    StartContainer,
    #[serde(rename = "container.detach")]
    DetachContainer,
    #[serde(rename = "container.delete")]
    DeleteContainer,
    #[serde(rename = "network.create")]
    CreateNetwork,
    #[serde(rename = "network.delete")]
    DeleteNetwork,
    #[serde(rename = "network.attach")]
    AttachNetwork,
}

impl TaskKind {
    /// 모든 태스크 종류
    pub const ALL: [TaskKind; 8] = [
        Self::PullImage,
        Self::CreateContainer,
        Self::StartContainer,
        Self::DetachContainer,
        Self::DeleteContainer,
        Self::CreateNetwork,
        Self::DeleteNetwork,
        Self::AttachNetwork,
    ];

    /// 로그와 메트릭 레이블에 쓰는 고정 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullImage => "image.pull",
            Self::CreateContainer => "container.create",
            Self::StartContainer => "container.start",
            Self::DetachContainer => "container.detach",
            Self::DeleteContainer => "container.delete",
            Self::CreateNetwork => "network.create",
            Self::DeleteNetwork => "network.delete",
            Self::AttachNetwork => "network.attach",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 백엔드 작업 하나
///
/// 이름은 모두 물리 이름(접두어 포함)입니다. 이미지 풀은 `image:tag` 참조를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Task {
    /// 이미지 풀
    #[serde(rename = "image.pull")]
    PullImage {
        /// `image:tag`
        #[serde(rename = "name")]
        image: String,
    },
    /// 컨테이너 생성 (시작하지 않음)
    #[serde(rename = "container.create")]
    CreateContainer { name: String, plan: ResourcePlan },
    /// 컨테이너 시작
    #[serde(rename = "container.start")]
    StartContainer { name: String },
    /// 컨테이너를 모든 네트워크에서 분리
    #[serde(rename = "container.detach")]
    DetachContainer { name: String },
    /// 컨테이너 삭제
    #[serde(rename = "container.delete")]
    DeleteContainer { name: String },
    /// 네트워크 생성
    #[serde(rename = "network.create")]
    CreateNetwork { name: String },
    /// 네트워크 삭제
    #[serde(rename = "network.delete")]
    DeleteNetwork { name: String },
    /// 컨테이너를 네트워크에 연결
    #[serde(rename = "network.attach")]
    AttachNetwork {
        #[serde(rename = "name")]
        network: String,
        #[serde(rename = "target")]
        container: String,
    },
}

impl Task {
    /// 태스크 종류를 반환합니다.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::PullImage { .. } => TaskKind::PullImage,
            Self::CreateContainer { .. } => TaskKind::CreateContainer,
            Self::StartContainer { .. } => TaskKind::StartContainer,
            Self::DetachContainer { .. } => TaskKind::DetachContainer,
            Self::DeleteContainer { .. } => TaskKind::DeleteContainer,
            Self::CreateNetwork { .. } => TaskKind::CreateNetwork,
            Self::DeleteNetwork { .. } => TaskKind::DeleteNetwork,
            Self::AttachNetwork { .. } => TaskKind::AttachNetwork,
        }
    }

    /// 태스크의 주 대상 이름을 반환합니다.
    ///
    /// 연결 태스크는 네트워크 이름을, 이미지 풀은 이미지 참조를 반환합니다.
    pub fn name(&self) -> &str {
        match self {
            Self::PullImage { image } => image,
            Self::CreateContainer { name, .. }
            | Self::StartContainer { name }
            | Self::DetachContainer { name }
            | Self::DeleteContainer { name }
            | Self::CreateNetwork { name }
            | Self::DeleteNetwork { name } => name,
            Self::AttachNetwork { network, .. } => network,
        }
    }

    /// 연결 태스크의 대상 컨테이너를 반환합니다.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::AttachNetwork { container, .. } => Some(container),
            _ => None,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachNetwork { network, container } => {
                write!(f, "{} {network} -> {container}", self.kind())
            }
            other => write!(f, "{} {}", other.kind(), other.name()),
        }
    }
}

/// 동시에 실행해도 안전한 태스크 묶음
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParallelBatch {
    tasks: Vec<Task>,
}

impl ParallelBatch {
    /// 태스크 목록으로 배치를 만듭니다.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// 배치의 태스크 목록을 반환합니다.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// 태스크 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// 빈 배치인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 주어진 종류와 이름의 태스크를 포함하는지 확인합니다.
    pub fn contains(&self, kind: TaskKind, name: &str) -> bool {
        self.tasks
            .iter()
            .any(|t| t.kind() == kind && t.name() == name)
    }
}

impl IntoIterator for ParallelBatch {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

/// 순서 있는 스테이지 목록
///
/// 빈 배치는 저장하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    stages: Vec<ParallelBatch>,
}

impl Plan {
    /// 빈 플랜을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스테이지를 뒤에 추가합니다. 태스크가 없으면 무시합니다.
    pub fn push_stage(&mut self, tasks: Vec<Task>) {
        if !tasks.is_empty() {
            self.stages.push(ParallelBatch::new(tasks));
        }
    }

    /// 스테이지 목록을 반환합니다.
    pub fn stages(&self) -> &[ParallelBatch] {
        &self.stages
    }

    /// 스테이지 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// 할 일이 없는 플랜인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// 전체 태스크 수를 반환합니다.
    pub fn task_count(&self) -> usize {
        self.stages.iter().map(ParallelBatch::len).sum()
    }

    /// 모든 태스크를 스테이지 순서대로 순회합니다.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.stages.iter().flat_map(|s| s.tasks().iter())
    }

    /// 주어진 종류와 이름의 태스크가 처음 나오는 스테이지 인덱스를 반환합니다.
    pub fn stage_of(&self, kind: TaskKind, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.contains(kind, name))
    }
}

impl IntoIterator for Plan {
    type Item = ParallelBatch;
    type IntoIter = std::vec::IntoIter<ParallelBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.stages.iter().enumerate() {
            let tasks: Vec<String> = stage.tasks().iter().map(ToString::to_string).collect();
            writeln!(f, "[{index}] {}", tasks.join(", "))?;
        }
        Ok(())
    }
}
