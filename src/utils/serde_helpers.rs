/// 请求体反序列化辅助函数

use serde::{Deserialize, Deserializer};

/// 区分缺省字段与显式 `null`
///
/// 需配合 `#[serde(default)]`：缺省为 `None`，`null` 为 `Some(None)`，
/// 有值为 `Some(Some(v))`。
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        group: Option<Option<String>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.group, None);

        let null: Patch = serde_json::from_str(r#"{"group": null}"#).unwrap();
        assert_eq!(null.group, Some(None));

        let value: Patch = serde_json::from_str(r#"{"group": "g1"}"#).unwrap();
        assert_eq!(value.group, Some(Some("g1".to_string())));
    }
}
