//! 도메인 타입 -- 원하는 상태와 관측 상태
//!
//! [`ResourcePlan`]은 호출자가 선언한 컨테이너 하나의 명세이고,
//! [`ObservedState`]는 백엔드를 조회해 얻은 실제 상태입니다.
//! 두 타입 모두 논리 이름(네임스페이스 접두어가 제거된 이름)을 사용합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 태그가 지정되지 않은 이미지의 기본 태그
pub const DEFAULT_TAG: &str = "latest";

fn default_tag() -> String {
    DEFAULT_TAG.to_owned()
}

fn default_enabled() -> bool {
    true
}

/// Docker 리소스 이름 규칙(`[a-zA-Z0-9][a-zA-Z0-9_.-]*`)을 만족하는지 확인합니다.
///
/// 접두어와 논리 이름을 붙인 물리 이름, 네트워크 이름 검증에 사용합니다.
pub fn is_valid_resource_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    name.len() <= 255 && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// 원하는 컨테이너 하나의 선언적 명세
///
/// `image`, `tag`, `enabled`, `networks`만 조정 로직에서 해석되고,
/// 나머지 필드는 핑거프린트에 포함되어 백엔드로 그대로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// 이미지 참조 (태그 제외)
    pub image: String,
    /// 이미지 태그
    #[serde(default = "default_tag")]
    pub tag: String,
    /// 조정 대상 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 연결할 네트워크 (논리 이름, 선언 순서 유지)
    #[serde(default)]
    pub networks: Vec<String>,
    /// 환경변수
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// 컨테이너 실행 명령 (비어 있으면 이미지 기본값)
    #[serde(default)]
    pub command: Vec<String>,
    /// 포트 바인딩 (`host:container[/proto]`)
    #[serde(default)]
    pub ports: Vec<String>,
    /// 재시작 정책 (no, always, unless-stopped, on-failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
}

impl ResourcePlan {
    /// 기본 태그와 빈 네트워크 목록으로 활성화된 명세를 생성합니다.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            tag: default_tag(),
            enabled: true,
            networks: Vec::new(),
            env: BTreeMap::new(),
            command: Vec::new(),
            ports: Vec::new(),
            restart: None,
        }
    }

    /// 태그를 설정합니다.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// 연결할 네트워크를 설정합니다.
    pub fn with_networks<I, S>(mut self, networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.networks = networks.into_iter().map(Into::into).collect();
        self
    }

    /// 활성화 여부를 설정합니다.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 환경변수를 하나 추가합니다.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// `image:tag` 형식의 풀 가능한 이미지 참조를 반환합니다.
    ///
    /// 태그가 비어 있으면 [`DEFAULT_TAG`]를 사용합니다.
    pub fn image_ref(&self) -> String {
        let tag = if self.tag.is_empty() {
            DEFAULT_TAG
        } else {
            self.tag.as_str()
        };
        format!("{}:{}", self.image, tag)
    }
}

/// 논리 이름 → 명세 매핑
///
/// `BTreeMap`이므로 순회 순서(그리고 생성되는 플랜)가 항상 결정적입니다.
pub type DesiredMap = BTreeMap<String, ResourcePlan>;

/// 백엔드에서 관측한 상태
///
/// 모든 이름은 네임스페이스 접두어가 제거된 논리 이름입니다.
/// 목록에는 중복이 있을 수 있으며, 중복은 조정 단계에서 강제 재생성 신호로 처리됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    /// 관측된 컨테이너 논리 이름
    pub containers: Vec<String>,
    /// 관측된 네트워크 논리 이름
    pub networks: Vec<String>,
    /// 컨테이너별 마지막 적용 핑거프린트 (기록 없으면 빈 문자열)
    pub fingerprints: BTreeMap<String, String>,
}

impl ObservedState {
    /// 빈 관측 상태를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 컨테이너를 핑거프린트와 함께 추가합니다.
    pub fn with_container(mut self, name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let name = name.into();
        self.fingerprints.insert(name.clone(), fingerprint.into());
        self.containers.push(name);
        self
    }

    /// 네트워크를 추가합니다.
    pub fn with_network(mut self, name: impl Into<String>) -> Self {
        self.networks.push(name.into());
        self
    }

    /// 컨테이너에 기록된 핑거프린트를 반환합니다. 기록이 없으면 빈 문자열입니다.
    pub fn fingerprint_of(&self, name: &str) -> &str {
        self.fingerprints.get(name).map(String::as_str).unwrap_or("")
    }

    /// 관측된 리소스가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.networks.is_empty()
    }
}

impl fmt::Display for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "containers=[{}] networks=[{}]",
            self.containers.join(","),
            self.networks.join(",")
        )
    }
}
