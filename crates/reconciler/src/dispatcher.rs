//! 태스크 디스패치 -- 단일 태스크를 백엔드 호출로 변환
//!
//! [`TaskDispatcher`]는 [`Task`] 하나를 받아 정확히 그에 대응하는 백엔드 연산을 호출합니다.
//! 생성하는 리소스에는 소유 표시 레이블을, 컨테이너에는 추가로 명세 핑거프린트를 기록합니다.
//!
//! 변경/삭제 연산 전에는 대상 리소스의 레이블을 확인하여 소유 표시가 없으면
//! [`ReconcileError::NotOwned`]로 거부합니다. 이미 사라진 리소스의 삭제는 성공으로 처리합니다.
//!
//! 배치, 재시도, 순서 보장은 하지 않습니다. 이는 [`PlanExecutor`](crate::executor::PlanExecutor)의 몫입니다.

use std::sync::Arc;

use tracing::{debug, info};

use fleetform_core::types::ResourcePlan;

use crate::docker::{DockerBackend, Labels};
use crate::error::ReconcileError;
use crate::fingerprint::fingerprint;
use crate::task::Task;

/// 생성 리소스에 기록하는 물리 이름 레이블 키
pub const NAME_LABEL: &str = "name";

/// 태스크 디스패처
pub struct TaskDispatcher<B: DockerBackend> {
    /// Docker 백엔드
    backend: Arc<B>,
    /// 소유 표시 레이블 (key, value)
    marker: (String, String),
    /// 핑거프린트 레이블 키
    hash_label: String,
}

impl<B: DockerBackend> TaskDispatcher<B> {
    /// 새 디스패처를 생성합니다.
    pub fn new(
        backend: Arc<B>,
        marker: (String, String),
        hash_label: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            marker,
            hash_label: hash_label.into(),
        }
    }

    /// 백엔드 참조를 반환합니다.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// 태스크 하나를 실행합니다.
    pub async fn dispatch(&self, task: &Task) -> Result<(), ReconcileError> {
        debug!(task = %task, "dispatching task");

        match task {
            Task::PullImage { image } => self.backend.pull_image(image).await,
            Task::CreateContainer { name, plan } => self.create_container(name, plan).await,
            Task::StartContainer { name } => {
                self.require_owned_container(name).await?;
                self.backend.start_container(name).await
            }
            Task::DetachContainer { name } => self.detach_container(name).await,
            Task::DeleteContainer { name } => self.delete_container(name).await,
            Task::CreateNetwork { name } => {
                self.backend
                    .create_network(name, self.base_labels(name))
                    .await
            }
            Task::DeleteNetwork { name } => self.delete_network(name).await,
            Task::AttachNetwork { network, container } => {
                self.require_owned_network(network).await?;
                self.require_owned_container(container).await?;
                self.backend.connect_network(network, container).await
            }
        }
    }

    /// 소유 표시와 이름 레이블
    fn base_labels(&self, name: &str) -> Labels {
        let mut labels = Labels::new();
        labels.insert(self.marker.0.clone(), self.marker.1.clone());
        labels.insert(NAME_LABEL.to_owned(), name.to_owned());
        labels
    }

    /// 생성 컨테이너에 붙일 레이블
    pub fn container_labels(&self, name: &str, plan: &ResourcePlan) -> Labels {
        let mut labels = self.base_labels(name);
        labels.insert(self.hash_label.clone(), fingerprint(plan).into());
        labels
    }

    fn is_owned(&self, labels: &Labels) -> bool {
        labels.get(&self.marker.0) == Some(&self.marker.1)
    }

    async fn create_container(&self, name: &str, plan: &ResourcePlan) -> Result<(), ReconcileError> {
        let labels = self.container_labels(name, plan);
        self.backend.create_container(name, plan, labels).await
    }

    async fn require_owned_container(&self, name: &str) -> Result<(), ReconcileError> {
        match self.backend.container_labels(name).await? {
            Some(labels) if self.is_owned(&labels) => Ok(()),
            Some(_) => Err(ReconcileError::NotOwned(name.to_owned())),
            None => Err(ReconcileError::NotFound(name.to_owned())),
        }
    }

    async fn require_owned_network(&self, name: &str) -> Result<(), ReconcileError> {
        match self.backend.network_labels(name).await? {
            Some(labels) if self.is_owned(&labels) => Ok(()),
            Some(_) => Err(ReconcileError::NotOwned(name.to_owned())),
            None => Err(ReconcileError::NotFound(name.to_owned())),
        }
    }

    /// 컨테이너를 연결된 모든 네트워크에서 분리합니다.
    async fn detach_container(&self, name: &str) -> Result<(), ReconcileError> {
        self.require_owned_container(name).await?;

        let networks = self.backend.container_networks(name).await?;
        for network in &networks {
            self.backend.disconnect_network(network, name).await?;
        }
        debug!(container = name, count = networks.len(), "detached container");
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<(), ReconcileError> {
        match self.backend.container_labels(name).await? {
            None => {
                info!(container = name, "container already gone, skipping delete");
                Ok(())
            }
            Some(labels) if !self.is_owned(&labels) => {
                Err(ReconcileError::NotOwned(name.to_owned()))
            }
            Some(_) => match self.backend.remove_container(name).await {
                Err(ReconcileError::NotFound(_)) => Ok(()),
                other => other,
            },
        }
    }

    async fn delete_network(&self, name: &str) -> Result<(), ReconcileError> {
        match self.backend.network_labels(name).await? {
            None => {
                info!(network = name, "network already gone, skipping delete");
                Ok(())
            }
            Some(labels) if !self.is_owned(&labels) => {
                Err(ReconcileError::NotOwned(name.to_owned()))
            }
            Some(_) => match self.backend.remove_network(name).await {
                Err(ReconcileError::NotFound(_)) => Ok(()),
                other => other,
            },
        }
    }
}
