//! 명세 핑거프린트
//!
//! [`ResourcePlan`]을 정규화된 JSON(객체 키를 재귀적으로 정렬)으로 직렬화한 뒤
//! SHA-256 해시의 16진수 표현 앞부분을 잘라 레이블 값으로 쓸 수 있는 짧은 토큰을 만듭니다.
//! 같은 내용의 명세는 필드 삽입 순서와 무관하게 항상 같은 핑거프린트를 가집니다.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use fleetform_core::types::ResourcePlan;

/// 핑거프린트 길이 (16진수 문자 수)
pub const FINGERPRINT_LEN: usize = 16;

/// 명세 내용에서 파생된 고정 길이 토큰
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 백엔드에 기록된 값과 일치하는지 확인합니다.
    pub fn matches(&self, recorded: &str) -> bool {
        self.0 == recorded
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// 명세의 핑거프린트를 계산합니다.
pub fn fingerprint(plan: &ResourcePlan) -> Fingerprint {
    Fingerprint(digest_prefix(&canonical_bytes(plan)))
}

/// 명세를 정규화된 JSON 바이트로 직렬화합니다.
///
/// 필드를 구조 분해하므로 `ResourcePlan`에 필드가 추가되면 여기서 컴파일 오류가 납니다.
/// `restart`는 설정된 경우에만 포함합니다.
fn canonical_bytes(plan: &ResourcePlan) -> Vec<u8> {
    let ResourcePlan {
        image,
        tag,
        enabled,
        networks,
        env,
        command,
        ports,
        restart,
    } = plan;

    let mut map = Map::new();
    map.insert("image".to_owned(), Value::from(image.as_str()));
    map.insert("tag".to_owned(), Value::from(tag.as_str()));
    map.insert("enabled".to_owned(), Value::Bool(*enabled));
    map.insert("networks".to_owned(), string_array(networks));
    map.insert(
        "env".to_owned(),
        Value::Object(
            env.iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect(),
        ),
    );
    map.insert("command".to_owned(), string_array(command));
    map.insert("ports".to_owned(), string_array(ports));
    if let Some(restart) = restart {
        map.insert("restart".to_owned(), Value::from(restart.as_str()));
    }

    canonicalize(Value::Object(map)).to_string().into_bytes()
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect())
}

/// 객체 키를 재귀적으로 정렬합니다.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn digest_prefix(bytes: &[u8]) -> String {
    let hex = format!("{:x}", Sha256::digest(bytes));
    hex[..FINGERPRINT_LEN].to_owned()
}
