//! 순서 보존 중복 제거
//!
//! 첫 등장 순서를 유지하면서 중복 값을 제거합니다. 관측 목록에서 발견된 중복은
//! 실제 상태가 이미 불일치한다는 신호이므로, 호출자는 콜백이나
//! [`partition_duplicates`]의 두 번째 결과로 중복 값을 받아 강제 재생성 목록에 넣습니다.

use std::collections::HashSet;

/// 중복을 제거하고, 두 번째 이후 등장마다 `on_duplicate`를 호출합니다.
///
/// 반환 목록은 각 값을 첫 등장 순서대로 한 번씩 담습니다.
/// 같은 값이 세 번 나오면 콜백은 두 번 호출됩니다.
pub fn dedup_with<I, S, F>(values: I, mut on_duplicate: F) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnMut(&str),
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for value in values {
        let value = value.into();
        if seen.contains(&value) {
            on_duplicate(&value);
        } else {
            seen.insert(value.clone());
            unique.push(value);
        }
    }
    unique
}

/// 콜백 없이 중복을 제거합니다.
pub fn dedup<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    dedup_with(values, |_| {})
}

/// 중복 제거 결과와 버려진 중복 등장 목록을 함께 반환합니다.
///
/// 두 번째 목록은 등장 순서를 유지하며, 같은 값이 여러 번 들어갈 수 있습니다.
pub fn partition_duplicates<I, S>(values: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut duplicates = Vec::new();
    let unique = dedup_with(values, |value| duplicates.push(value.to_owned()));
    (unique, duplicates)
}
