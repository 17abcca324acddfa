//! Limit/offset pagination for list endpoints
//!
//! `?limit=` must be a positive integer or the configured default applies;
//! `?offset=` falls back to 0 when missing, negative or malformed. When no
//! limit applies at all the caller returns a bare array.

use actix_web::{web, HttpRequest};
use serde::Serialize;

use crate::config::PaginationConfig;
use crate::db::Window;

const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Window requested by a single list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
    /// Absolute request URL without its query string
    base_url: String,
    /// Query parameters other than `limit` and `offset`
    params: Vec<(String, String)>,
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    web::Query::<Vec<(String, String)>>::from_query(query)
        .map(web::Query::into_inner)
        .unwrap_or_default()
}

fn param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

impl LimitOffset {
    /// Resolve the window for `req`; `None` disables pagination
    pub fn from_request(req: &HttpRequest, config: &PaginationConfig) -> Option<Self> {
        let info = req.connection_info();
        let base_url = format!("{}://{}{}", info.scheme(), info.host(), req.path());
        Self::resolve(base_url, req.query_string(), config)
    }

    pub fn resolve(base_url: String, query: &str, config: &PaginationConfig) -> Option<Self> {
        let pairs = query_pairs(query);

        let requested = param(&pairs, LIMIT_PARAM)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n > 0);
        let mut limit = requested.or(config.default_limit)?;
        if let Some(max) = config.max_limit {
            limit = limit.min(max);
        }

        let offset = param(&pairs, OFFSET_PARAM)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .unwrap_or(0);

        let params = pairs
            .into_iter()
            .filter(|(k, _)| k != LIMIT_PARAM && k != OFFSET_PARAM)
            .collect();

        Some(Self {
            limit,
            offset,
            base_url,
            params,
        })
    }

    pub fn window(&self) -> Window {
        Window {
            limit: self.limit,
            offset: self.offset,
        }
    }

    fn url(&self, offset: Option<i64>) -> String {
        let mut params = self.params.clone();
        params.push((LIMIT_PARAM.to_string(), self.limit.to_string()));
        if let Some(offset) = offset {
            params.push((OFFSET_PARAM.to_string(), offset.to_string()));
        }
        params.sort_by(|a, b| a.0.cmp(&b.0));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.base_url, query)
    }

    pub fn next_link(&self, count: i64) -> Option<String> {
        let next_offset = self.offset.saturating_add(self.limit);
        if next_offset >= count {
            return None;
        }
        Some(self.url(Some(next_offset)))
    }

    pub fn previous_link(&self) -> Option<String> {
        if self.offset <= 0 {
            return None;
        }
        if self.offset - self.limit <= 0 {
            return Some(self.url(None));
        }
        Some(self.url(Some(self.offset - self.limit)))
    }

    pub fn page<T>(&self, count: i64, results: Vec<T>) -> Page<T> {
        Page {
            count,
            next: self.next_link(count),
            previous: self.previous_link(),
            results,
        }
    }
}
