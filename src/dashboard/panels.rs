// src/dashboard/panels.rs
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

use crate::{api::types::format_mb, config::MonitoredPath, dashboard::page::Cell};

pub const SECURITY_HEADERS: [&str; 5] = [
    "Strict-Transport-Security",
    "Content-Security-Policy",
    "X-Content-Type-Options",
    "X-Frame-Options",
    "X-XSS-Protection",
];

pub const CACHING_HEADERS: [&str; 9] = [
    "Cache-Control",
    "Expires",
    "Age",
    "Last-Modified",
    "ETag",
    "X-Cache-Enabled",
    "X-Cache-Disabled",
    "X-Srcache-Store-Status",
    "X-Srcache-Fetch-Status",
];

const NOT_PRESENT: &str = "Not present";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type Rows = Vec<(String, Cell)>;

/// Storage statistics for one database table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub name: String,
    pub data_length: u64,
    pub index_length: u64,
}

/// Host-side source of per-table storage statistics.
pub trait TableStatusSource: Send + Sync {
    fn table_status(&self) -> Result<Vec<TableStatus>, String>;
}

fn values_of<'h>(headers: &'h [(String, String)], name: &str) -> Vec<&'h str> {
    headers
        .iter()
        .filter(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
        .collect()
}

pub fn security_rows(headers: &[(String, String)]) -> Rows {
    SECURITY_HEADERS
        .iter()
        .map(|name| {
            let ok = !values_of(headers, name).is_empty();
            let text = if ok { "OK" } else { NOT_PRESENT };
            (
                name.to_string(),
                Cell::Flag {
                    text: text.to_string(),
                    ok,
                },
            )
        })
        .collect()
}

pub fn caching_rows(headers: &[(String, String)]) -> Rows {
    CACHING_HEADERS
        .iter()
        .map(|name| {
            let values = values_of(headers, name);
            let cell = if values.is_empty() {
                Cell::Flag {
                    text: NOT_PRESENT.to_string(),
                    ok: false,
                }
            } else {
                Cell::Lines(values.iter().map(|v| format!("{name}: {v}")).collect())
            };
            (name.to_string(), cell)
        })
        .collect()
}

pub fn header_failure_rows() -> Rows {
    vec![(
        "Response headers".to_string(),
        Cell::Flag {
            text: "Headers could not be fetched".to_string(),
            ok: false,
        },
    )]
}

/// One pending cell per monitored directory.
pub fn size_rows(monitored: &[MonitoredPath]) -> Rows {
    monitored
        .iter()
        .map(|m| {
            (
                format!("{} directory size", m.label),
                Cell::Pending {
                    path: m.path.to_string_lossy().into_owned(),
                },
            )
        })
        .collect()
}

/// `None` when the source has no tables or cannot be read.
pub fn database_row(source: &dyn TableStatusSource) -> Option<(String, Cell)> {
    let tables = match source.table_status() {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, "table status unavailable");
            return None;
        }
    };
    if tables.is_empty() {
        return None;
    }
    let bytes = tables.iter().fold(0u64, |acc, t| {
        acc.saturating_add(t.data_length)
            .saturating_add(t.index_length)
    });
    Some(("Database size".to_string(), Cell::Text(format_mb(bytes))))
}

pub fn runtime_rows(now: DateTime<Local>, log_filter: &str) -> Rows {
    let utc: DateTime<Utc> = now.with_timezone(&Utc);
    let parallelism = std::thread::available_parallelism()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    vec![
        ("Architecture", std::env::consts::ARCH.to_string()),
        ("Operating system", std::env::consts::OS.to_string()),
        ("OS family", std::env::consts::FAMILY.to_string()),
        (
            "Service version",
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        ),
        ("Process id", std::process::id().to_string()),
        ("Available parallelism", parallelism),
        ("Log filter", log_filter.to_string()),
        ("Current time", now.format(TIME_FORMAT).to_string()),
        ("Current UTC time", utc.format(TIME_FORMAT).to_string()),
        ("UTC offset", now.offset().to_string()),
    ]
    .into_iter()
    .map(|(title, value)| (title.to_string(), Cell::Text(value)))
    .collect()
}

pub fn constant_rows(constants: &BTreeMap<String, String>) -> Rows {
    if constants.is_empty() {
        return vec![("No constants defined".to_string(), Cell::Text(String::new()))];
    }
    constants
        .iter()
        .map(|(k, v)| (k.clone(), Cell::Text(v.clone())))
        .collect()
}
