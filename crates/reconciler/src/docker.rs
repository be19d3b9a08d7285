//! Docker API abstraction for testability.
//!
//! The [`DockerBackend`] trait abstracts the bollard Docker API, allowing
//! production code to use [`BollardBackend`] while tests use `MockDockerBackend`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐
//! │ observer │   │ TaskDispatcher │
//! └────┬─────┘   └───────┬────────┘
//!      │                 │
//!      ▼                 ▼
//!   ┌──────────────────────┐
//!   │ DockerBackend (trait)│
//!   └──────────────────────┘
//!        │           │
//!        ▼           ▼
//!   ┌─────────┐  ┌──────┐
//!   │ Bollard │  │ Mock │
//!   └────┬────┘  └──────┘
//!        │
//!        ▼
//!   Docker Daemon
//! ```
//!
//! # Name Validation
//!
//! All methods that accept a container or network name validate it before
//! calling the daemon (see [`is_valid_resource_name`]).
//! Image references are passed through unchanged.
//!
//! # Ownership
//!
//! The backend performs no ownership checks. Callers inspect labels with
//! [`container_labels`](DockerBackend::container_labels) or
//! [`network_labels`](DockerBackend::network_labels) first.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bollard::models::{
    EndpointSettings, HostConfig, PortBinding, RestartPolicy, RestartPolicyNameEnum,
};
use futures_util::StreamExt;
use tracing::debug;

use fleetform_core::types::{ResourcePlan, is_valid_resource_name};

use crate::error::ReconcileError;

/// 리소스 레이블
pub type Labels = HashMap<String, String>;

/// 목록 조회 결과 한 건
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSummary {
    /// 물리 이름 (앞의 `/` 제거됨)
    pub name: String,
    /// 리소스에 붙은 레이블
    pub labels: Labels,
}

impl ResourceSummary {
    /// 새 요약을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
        }
    }

    /// 레이블을 추가합니다.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// 레이블 값을 조회합니다.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Validates a container or network name before it reaches the daemon.
fn validate_name(name: &str) -> Result<(), ReconcileError> {
    if is_valid_resource_name(name) {
        Ok(())
    } else {
        Err(ReconcileError::InvalidName(name.to_owned()))
    }
}

/// Trait abstracting the Docker operations the reconciler needs.
///
/// The trait is `Send + Sync + 'static`, allowing safe sharing across async tasks.
///
/// # Implementations
///
/// - [`BollardBackend`]: Production implementation using the `bollard` library
/// - `MockDockerBackend`: In-memory implementation (available in tests only)
///
/// # Error Handling
///
/// - **404 errors**: `inspect`-style lookups return `Ok(None)`, mutations return
///   `ReconcileError::NotFound`
/// - **Connection errors**: Wrapped as `ReconcileError::DockerConnection`
/// - **Other failures**: Wrapped as `ReconcileError::DockerApi`
pub trait DockerBackend: Send + Sync + 'static {
    /// Lists all containers, running or not.
    fn list_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<ResourceSummary>, ReconcileError>> + Send;

    /// Lists all networks.
    fn list_networks(
        &self,
    ) -> impl Future<Output = Result<Vec<ResourceSummary>, ReconcileError>> + Send;

    /// Returns a container's labels, or `None` if it does not exist.
    fn container_labels(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Labels>, ReconcileError>> + Send;

    /// Returns a network's labels, or `None` if it does not exist.
    fn network_labels(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Labels>, ReconcileError>> + Send;

    /// Returns the names of the networks a container is connected to.
    ///
    /// # Errors
    ///
    /// - `ReconcileError::NotFound`: Container does not exist
    fn container_networks(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, ReconcileError>> + Send;

    /// Pulls an image reference (`image:tag`), waiting until the pull finishes.
    fn pull_image(&self, image: &str)
    -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Creates (but does not start) a container from a plan.
    fn create_container(
        &self,
        name: &str,
        plan: &ResourcePlan,
        labels: Labels,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Starts a created container.
    fn start_container(&self, name: &str)
    -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Force-removes a container.
    fn remove_container(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Creates a network.
    fn create_network(
        &self,
        name: &str,
        labels: Labels,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Removes a network.
    fn remove_network(&self, name: &str)
    -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Connects a container to a network.
    fn connect_network(
        &self,
        network: &str,
        container: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Disconnects a container from a network.
    ///
    /// Uses `force: true` so running containers are disconnected too.
    fn disconnect_network(
        &self,
        network: &str,
        container: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Checks Docker daemon connectivity.
    fn ping(&self) -> impl Future<Output = Result<(), ReconcileError>> + Send;
}

/// Production backend implementation using `bollard`.
///
/// Internally uses `Arc<bollard::Docker>` for safe sharing across async tasks.
///
/// # Examples
///
/// ```ignore
/// use fleetform_reconciler::BollardBackend;
///
/// let backend = BollardBackend::connect_local()?;
/// let backend = BollardBackend::connect_with_socket("/run/docker.sock", 120)?;
/// # Ok::<(), fleetform_reconciler::ReconcileError>(())
/// ```
pub struct BollardBackend {
    docker: Arc<bollard::Docker>,
}

impl BollardBackend {
    /// Connects to Docker using the platform's default local socket.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::DockerConnection` if the connection fails.
    pub fn connect_local() -> Result<Self, ReconcileError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            ReconcileError::DockerConnection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to Docker using a specific socket path and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::DockerConnection` if the connection fails.
    pub fn connect_with_socket(
        socket_path: &str,
        timeout_secs: u64,
    ) -> Result<Self, ReconcileError> {
        let docker = bollard::Docker::connect_with_socket(
            socket_path,
            timeout_secs,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| {
            ReconcileError::DockerConnection(format!(
                "failed to connect to docker at {socket_path}: {e}"
            ))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects using a socket path, or the local default when the path is empty.
    pub fn connect(socket_path: &str, timeout_secs: u64) -> Result<Self, ReconcileError> {
        if socket_path.is_empty() {
            Self::connect_local()
        } else {
            Self::connect_with_socket(socket_path, timeout_secs)
        }
    }
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// Maps a bollard error, turning 404 into `NotFound`.
fn api_error(err: bollard::errors::Error, name: &str, action: &str) -> ReconcileError {
    if is_not_found(&err) {
        ReconcileError::NotFound(name.to_owned())
    } else {
        ReconcileError::DockerApi(format!("{action} '{name}' failed: {err}"))
    }
}

/// Parses `host:container[/proto]` or `container[/proto]`.
///
/// Returns the container port key (`80/tcp`) and the optional host port.
fn parse_port(spec: &str) -> Result<(String, Option<String>), ReconcileError> {
    let invalid = || ReconcileError::Config {
        field: "ports".to_owned(),
        reason: format!("'{spec}' is not a valid port mapping"),
    };
    let (ports, proto) = match spec.split_once('/') {
        Some((ports, proto)) if proto == "tcp" || proto == "udp" => (ports, proto),
        Some(_) => return Err(invalid()),
        None => (spec, "tcp"),
    };
    let (host, container) = match ports.split_once(':') {
        Some((host, container)) => (Some(host), container),
        None => (None, ports),
    };
    if container.parse::<u16>().is_err() || host.is_some_and(|h| h.parse::<u16>().is_err()) {
        return Err(invalid());
    }
    Ok((format!("{container}/{proto}"), host.map(str::to_owned)))
}

fn parse_restart(policy: &str) -> Result<RestartPolicyNameEnum, ReconcileError> {
    match policy {
        "no" => Ok(RestartPolicyNameEnum::NO),
        "always" => Ok(RestartPolicyNameEnum::ALWAYS),
        "unless-stopped" => Ok(RestartPolicyNameEnum::UNLESS_STOPPED),
        "on-failure" => Ok(RestartPolicyNameEnum::ON_FAILURE),
        other => Err(ReconcileError::Config {
            field: "restart".to_owned(),
            reason: format!("unknown restart policy '{other}'"),
        }),
    }
}

/// Builds the container create body for a plan.
fn container_config(
    plan: &ResourcePlan,
    labels: Labels,
) -> Result<bollard::container::Config<String>, ReconcileError> {
    let mut exposed_ports = HashMap::new();
    let mut port_bindings = HashMap::new();
    for spec in &plan.ports {
        let (key, host_port) = parse_port(spec)?;
        exposed_ports.insert(key.clone(), HashMap::new());
        if let Some(host_port) = host_port {
            port_bindings.insert(
                key,
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(host_port),
                }]),
            );
        }
    }

    let restart_policy = plan
        .restart
        .as_deref()
        .map(parse_restart)
        .transpose()?
        .map(|name| RestartPolicy {
            name: Some(name),
            maximum_retry_count: None,
        });

    let env: Vec<String> = plan.env.iter().map(|(k, v)| format!("{k}={v}")).collect();

    Ok(bollard::container::Config {
        image: Some(plan.image_ref()),
        env: (!env.is_empty()).then_some(env),
        cmd: (!plan.command.is_empty()).then(|| plan.command.clone()),
        labels: Some(labels),
        exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
        host_config: Some(HostConfig {
            port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
            restart_policy,
            ..Default::default()
        }),
        ..Default::default()
    })
}

impl DockerBackend for BollardBackend {
    async fn list_containers(&self) -> Result<Vec<ResourceSummary>, ReconcileError> {
        use bollard::container::ListContainersOptions;

        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| ReconcileError::DockerApi(format!("list containers failed: {e}")))?;

        Ok(containers
            .into_iter()
            .map(|c| ResourceSummary {
                name: c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_owned())
                    .unwrap_or_default(),
                labels: c.labels.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_networks(&self) -> Result<Vec<ResourceSummary>, ReconcileError> {
        use bollard::network::ListNetworksOptions;

        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await
            .map_err(|e| ReconcileError::DockerApi(format!("list networks failed: {e}")))?;

        Ok(networks
            .into_iter()
            .map(|n| ResourceSummary {
                name: n
                    .name
                    .map(|name| name.trim_start_matches('/').to_owned())
                    .unwrap_or_default(),
                labels: n.labels.unwrap_or_default(),
            })
            .collect())
    }

    async fn container_labels(&self, name: &str) -> Result<Option<Labels>, ReconcileError> {
        validate_name(name)?;

        match self.docker.inspect_container(name, None).await {
            Ok(details) => Ok(Some(
                details.config.and_then(|c| c.labels).unwrap_or_default(),
            )),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(api_error(e, name, "inspect container")),
        }
    }

    async fn network_labels(&self, name: &str) -> Result<Option<Labels>, ReconcileError> {
        use bollard::network::InspectNetworkOptions;

        validate_name(name)?;

        match self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions<String>>)
            .await
        {
            Ok(network) => Ok(Some(network.labels.unwrap_or_default())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(api_error(e, name, "inspect network")),
        }
    }

    async fn container_networks(&self, name: &str) -> Result<Vec<String>, ReconcileError> {
        validate_name(name)?;

        let details = self
            .docker
            .inspect_container(name, None)
            .await
            .map_err(|e| api_error(e, name, "inspect container"))?;

        let mut networks: Vec<String> = details
            .network_settings
            .and_then(|s| s.networks)
            .map(|n| n.into_keys().collect())
            .unwrap_or_default();
        networks.sort();
        Ok(networks)
    }

    async fn pull_image(&self, image: &str) -> Result<(), ReconcileError> {
        use bollard::image::CreateImageOptions;

        let options = CreateImageOptions::<String> {
            from_image: image.to_owned(),
            ..Default::default()
        };

        let mut progress = std::pin::pin!(self.docker.create_image(Some(options), None, None));
        while let Some(item) = progress.next().await {
            item.map_err(|e| api_error(e, image, "pull image"))?;
        }
        Ok(())
    }

    async fn create_container(
        &self,
        name: &str,
        plan: &ResourcePlan,
        labels: Labels,
    ) -> Result<(), ReconcileError> {
        use bollard::container::CreateContainerOptions;

        validate_name(name)?;

        let config = container_config(plan, labels)?;
        let options = CreateContainerOptions {
            name: name.to_owned(),
            platform: None,
        };

        self.docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| api_error(e, name, "create container"))?;
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<(), ReconcileError> {
        use bollard::container::StartContainerOptions;

        validate_name(name)?;

        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| api_error(e, name, "start container"))
    }

    async fn remove_container(&self, name: &str) -> Result<(), ReconcileError> {
        use bollard::container::RemoveContainerOptions;

        validate_name(name)?;

        self.docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| api_error(e, name, "remove container"))
    }

    async fn create_network(&self, name: &str, labels: Labels) -> Result<(), ReconcileError> {
        use bollard::network::CreateNetworkOptions;

        validate_name(name)?;

        let options = CreateNetworkOptions::<String> {
            name: name.to_owned(),
            labels,
            ..Default::default()
        };

        self.docker
            .create_network(options)
            .await
            .map_err(|e| api_error(e, name, "create network"))?;
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<(), ReconcileError> {
        use bollard::network::InspectNetworkOptions;

        validate_name(name)?;

        // 연결된 엔드포인트가 남아 있으면 데몬이 삭제를 거부함
        let network = self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions<String>>)
            .await
            .map_err(|e| api_error(e, name, "inspect network"))?;
        let attached: Vec<String> = network
            .containers
            .unwrap_or_default()
            .into_values()
            .filter_map(|c| c.name)
            .collect();
        for container in &attached {
            debug!(network = %name, container = %container, "disconnecting before network removal");
            self.disconnect_network(name, container).await?;
        }

        self.docker
            .remove_network(name)
            .await
            .map_err(|e| api_error(e, name, "remove network"))
    }

    async fn connect_network(&self, network: &str, container: &str) -> Result<(), ReconcileError> {
        use bollard::network::ConnectNetworkOptions;

        validate_name(network)?;
        validate_name(container)?;

        self.docker
            .connect_network(
                network,
                ConnectNetworkOptions {
                    container: container.to_owned(),
                    endpoint_config: EndpointSettings::default(),
                },
            )
            .await
            .map_err(|e| api_error(e, network, "connect network"))
    }

    async fn disconnect_network(
        &self,
        network: &str,
        container: &str,
    ) -> Result<(), ReconcileError> {
        use bollard::network::DisconnectNetworkOptions;

        validate_name(network)?;
        validate_name(container)?;

        self.docker
            .disconnect_network(
                network,
                DisconnectNetworkOptions {
                    container: container.to_owned(),
                    force: true,
                },
            )
            .await
            .map_err(|e| api_error(e, network, "disconnect network"))
    }

    async fn ping(&self) -> Result<(), ReconcileError> {
        self.docker
            .ping()
            .await
            .map_err(|e| ReconcileError::DockerConnection(format!("ping failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
pub use mock::MockDockerBackend;

/// 테스트용 인메모리 Docker 백엔드
///
/// 호출을 기록하고 상태를 실제로 변경하므로 조정 결과가 수렴하는지 검증할 수 있습니다.
#[cfg(test)]
mod mock {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct MockContainer {
        pub labels: Labels,
        pub networks: Vec<String>,
        pub running: bool,
    }

    #[derive(Default)]
    struct MockState {
        containers: BTreeMap<String, MockContainer>,
        networks: BTreeMap<String, Labels>,
        images: Vec<String>,
        calls: Vec<String>,
    }

    /// 테스트용 Mock Docker 백엔드
    #[derive(Default)]
    pub struct MockDockerBackend {
        state: Mutex<MockState>,
        /// `"<call> <name>"` 형태로 실패시킬 호출
        failing: HashSet<String>,
        unreachable: bool,
    }

    impl MockDockerBackend {
        /// 빈 상태의 mock 백엔드를 생성합니다.
        pub fn new() -> Self {
            Self::default()
        }

        /// 컨테이너를 추가합니다.
        pub fn with_container(self, name: &str, labels: &[(&str, &str)]) -> Self {
            self.state.lock().unwrap().containers.insert(
                name.to_owned(),
                MockContainer {
                    labels: to_labels(labels),
                    networks: vec!["bridge".to_owned()],
                    running: true,
                },
            );
            self
        }

        /// 네트워크를 추가합니다.
        pub fn with_network(self, name: &str, labels: &[(&str, &str)]) -> Self {
            self.state
                .lock()
                .unwrap()
                .networks
                .insert(name.to_owned(), to_labels(labels));
            self
        }

        /// 특정 호출이 실패하도록 설정합니다. 예: `"create_container ff_web"`
        pub fn failing_on(mut self, call: &str) -> Self {
            self.failing.insert(call.to_owned());
            self
        }

        /// 모든 호출이 연결 에러를 반환하도록 설정합니다.
        pub fn unreachable(mut self) -> Self {
            self.unreachable = true;
            self
        }

        /// 지금까지의 호출 기록
        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        /// 컨테이너 상태 조회
        pub fn container(&self, name: &str) -> Option<MockContainer> {
            self.state.lock().unwrap().containers.get(name).cloned()
        }

        /// 네트워크 존재 여부
        pub fn has_network(&self, name: &str) -> bool {
            self.state.lock().unwrap().networks.contains_key(name)
        }

        /// 풀한 이미지 목록
        pub fn pulled_images(&self) -> Vec<String> {
            self.state.lock().unwrap().images.clone()
        }

        fn record(&self, call: &str, name: &str) -> Result<(), ReconcileError> {
            if self.unreachable {
                return Err(ReconcileError::DockerConnection("mock unreachable".to_owned()));
            }
            let entry = format!("{call} {name}");
            let failing = self.failing.contains(&entry);
            self.state.lock().unwrap().calls.push(entry);
            if failing {
                return Err(ReconcileError::DockerApi(format!("mock failure: {call} {name}")));
            }
            Ok(())
        }
    }

    fn to_labels(labels: &[(&str, &str)]) -> Labels {
        labels
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    impl DockerBackend for MockDockerBackend {
        async fn list_containers(&self) -> Result<Vec<ResourceSummary>, ReconcileError> {
            self.record("list_containers", "*")?;
            Ok(self
                .state
                .lock()
                .unwrap()
                .containers
                .iter()
                .map(|(name, c)| ResourceSummary {
                    name: name.clone(),
                    labels: c.labels.clone(),
                })
                .collect())
        }

        async fn list_networks(&self) -> Result<Vec<ResourceSummary>, ReconcileError> {
            self.record("list_networks", "*")?;
            Ok(self
                .state
                .lock()
                .unwrap()
                .networks
                .iter()
                .map(|(name, labels)| ResourceSummary {
                    name: name.clone(),
                    labels: labels.clone(),
                })
                .collect())
        }

        async fn container_labels(&self, name: &str) -> Result<Option<Labels>, ReconcileError> {
            validate_name(name)?;
            Ok(self
                .state
                .lock()
                .unwrap()
                .containers
                .get(name)
                .map(|c| c.labels.clone()))
        }

        async fn network_labels(&self, name: &str) -> Result<Option<Labels>, ReconcileError> {
            validate_name(name)?;
            Ok(self.state.lock().unwrap().networks.get(name).cloned())
        }

        async fn container_networks(&self, name: &str) -> Result<Vec<String>, ReconcileError> {
            validate_name(name)?;
            self.state
                .lock()
                .unwrap()
                .containers
                .get(name)
                .map(|c| c.networks.clone())
                .ok_or_else(|| ReconcileError::NotFound(name.to_owned()))
        }

        async fn pull_image(&self, image: &str) -> Result<(), ReconcileError> {
            self.record("pull_image", image)?;
            self.state.lock().unwrap().images.push(image.to_owned());
            Ok(())
        }

        async fn create_container(
            &self,
            name: &str,
            plan: &ResourcePlan,
            labels: Labels,
        ) -> Result<(), ReconcileError> {
            validate_name(name)?;
            container_config(plan, labels.clone())?;
            self.record("create_container", name)?;
            let mut state = self.state.lock().unwrap();
            if state.containers.contains_key(name) {
                return Err(ReconcileError::DockerApi(format!("conflict: '{name}' exists")));
            }
            state.containers.insert(
                name.to_owned(),
                MockContainer {
                    labels,
                    networks: vec!["bridge".to_owned()],
                    running: false,
                },
            );
            Ok(())
        }

        async fn start_container(&self, name: &str) -> Result<(), ReconcileError> {
            validate_name(name)?;
            self.record("start_container", name)?;
            let mut state = self.state.lock().unwrap();
            let container = state
                .containers
                .get_mut(name)
                .ok_or_else(|| ReconcileError::NotFound(name.to_owned()))?;
            container.running = true;
            Ok(())
        }

        async fn remove_container(&self, name: &str) -> Result<(), ReconcileError> {
            validate_name(name)?;
            self.record("remove_container", name)?;
            self.state
                .lock()
                .unwrap()
                .containers
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ReconcileError::NotFound(name.to_owned()))
        }

        async fn create_network(&self, name: &str, labels: Labels) -> Result<(), ReconcileError> {
            validate_name(name)?;
            self.record("create_network", name)?;
            self.state
                .lock()
                .unwrap()
                .networks
                .insert(name.to_owned(), labels);
            Ok(())
        }

        async fn remove_network(&self, name: &str) -> Result<(), ReconcileError> {
            validate_name(name)?;
            self.record("remove_network", name)?;
            self.state
                .lock()
                .unwrap()
                .networks
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ReconcileError::NotFound(name.to_owned()))
        }

        async fn connect_network(
            &self,
            network: &str,
            container: &str,
        ) -> Result<(), ReconcileError> {
            validate_name(network)?;
            validate_name(container)?;
            self.record("connect_network", &format!("{network}->{container}"))?;
            let mut state = self.state.lock().unwrap();
            if !state.networks.contains_key(network) {
                return Err(ReconcileError::NotFound(network.to_owned()));
            }
            let entry = state
                .containers
                .get_mut(container)
                .ok_or_else(|| ReconcileError::NotFound(container.to_owned()))?;
            if !entry.networks.iter().any(|n| n == network) {
                entry.networks.push(network.to_owned());
            }
            Ok(())
        }

        async fn disconnect_network(
            &self,
            network: &str,
            container: &str,
        ) -> Result<(), ReconcileError> {
            validate_name(network)?;
            validate_name(container)?;
            self.record("disconnect_network", &format!("{network}->{container}"))?;
            let mut state = self.state.lock().unwrap();
            let entry = state
                .containers
                .get_mut(container)
                .ok_or_else(|| ReconcileError::NotFound(container.to_owned()))?;
            entry.networks.retain(|n| n != network);
            Ok(())
        }

        async fn ping(&self) -> Result<(), ReconcileError> {
            if self.unreachable {
                return Err(ReconcileError::DockerConnection("mock unreachable".to_owned()));
            }
            Ok(())
        }
    }
}
