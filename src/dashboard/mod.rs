// src/dashboard/mod.rs
use chrono::Local;
use tracing::warn;

use crate::server::AppState;

pub mod page;
pub mod panels;
pub mod probe;
pub mod render;

pub use page::{Cell, Page, Placeholder, Row, RowId, Section};

/// Assembles the dashboard. Directory sizes are left pending; the header
/// panels cost one request to the configured site, if any.
pub async fn build_page(state: &AppState) -> Page {
    let mut page = Page::new();

    let mut sizes = panels::size_rows(&state.config.monitored_paths);
    if let Some(tables) = &state.tables {
        sizes.extend(panels::database_row(tables.as_ref()));
    }
    page.push_section("Directory and database sizes", sizes);

    if let (Some(url), Some(probe)) = (&state.config.site_url, &state.probe) {
        match probe.fetch(url).await {
            Ok(headers) => {
                page.push_section("Security headers", panels::security_rows(&headers));
                page.push_section("Caching headers", panels::caching_rows(&headers));
            }
            Err(e) => {
                warn!(url = %url, error = %e, "header probe failed");
                page.push_section("Response headers", panels::header_failure_rows());
            }
        }
    }

    page.push_section(
        "Server runtime",
        panels::runtime_rows(Local::now(), &state.log_filter),
    );
    page.push_section("Constants", panels::constant_rows(&state.config.constants));
    page
}
