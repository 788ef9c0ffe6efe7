//! 按需启用的 limit/offset 分页
//!
//! 查询参数中没有 `limit` 或 `offset` 时返回完整数组，
//! 否则返回带 `count`/`next`/`previous` 的 [`Page`]。

use axum::http::{HeaderMap, Uri};

use crate::models::response::{Listing, Page};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: usize,
    pub offset: usize,
}

/// 请求地址，拆分为基础 URL 与解码后的查询参数
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    base_url: String,
    query: Vec<(String, String)>,
}

impl PageRequest {
    pub fn new(base_url: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            base_url: base_url.into(),
            query,
        }
    }

    /// 有 `Host` 头时生成绝对链接，否则只包含路径
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let host = headers
            .get("host")
            .and_then(|h| h.to_str().ok())
            .filter(|h| !h.is_empty());
        let scheme = match headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
        {
            Some("https") => "https",
            _ => "http",
        };

        let base_url = match host {
            Some(host) => format!("{}://{}{}", scheme, host, uri.path()),
            None => uri.path().to_string(),
        };

        let query = uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default();

        Self::new(base_url, query)
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 未提供 `limit` 与 `offset` 时返回 `None`
    pub fn limit_offset(&self) -> Option<LimitOffset> {
        let limit = self.param(LIMIT_PARAM);
        let offset = self.param(OFFSET_PARAM);
        if limit.is_none() && offset.is_none() {
            return None;
        }

        let limit = limit
            .and_then(parse_count)
            .filter(|v| *v > 0)
            .map(|v| v.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        let offset = offset.and_then(parse_count).unwrap_or(0);

        Some(LimitOffset { limit, offset })
    }

    fn link(&self, replace: &[(&str, usize)], remove: Option<&str>) -> String {
        let mut query = self.query.clone();
        for (key, value) in replace {
            let value = value.to_string();
            match query.iter_mut().find(|(k, _)| k == key) {
                Some(pair) => pair.1 = value,
                None => query.push((key.to_string(), value)),
            }
        }
        if let Some(key) = remove {
            query.retain(|(k, _)| k != key);
        }

        let encoded = serde_urlencoded::to_string(&query).unwrap_or_default();
        if encoded.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}?{}", self.base_url, encoded)
        }
    }
}

/// 解析非负整数，超出 `usize` 范围的数字取 `usize::MAX`
fn parse_count(value: &str) -> Option<usize> {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<usize>().unwrap_or(usize::MAX))
}

/// 对已排序的集合应用分页规则
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> Listing<T> {
    let Some(LimitOffset { limit, offset }) = request.limit_offset() else {
        return Listing::Full(items);
    };

    let count = items.len();

    let end = offset.saturating_add(limit);
    let next = (end < count)
        .then(|| request.link(&[(LIMIT_PARAM, limit), (OFFSET_PARAM, end)], None));

    let previous = if offset == 0 {
        None
    } else if offset <= limit {
        Some(request.link(&[(LIMIT_PARAM, limit)], Some(OFFSET_PARAM)))
    } else {
        Some(request.link(&[(LIMIT_PARAM, limit), (OFFSET_PARAM, offset - limit)], None))
    };

    let results = items.into_iter().skip(offset).take(limit).collect();

    Listing::Page(Page {
        count,
        next,
        previous,
        results,
    })
}
