// src/server.rs
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    api::{
        dir_size::{dir_size_handler, DirSizeService},
        dir_sizer::DIR_SIZE_ROUTE,
        fs::FileSystem,
    },
    config::Config,
    dashboard::{self, panels::TableStatusSource, probe::HeaderProbe, render::render_page},
};

pub const SCRIPT_ROUTE: &str = "/assets/status.js";

const STATUS_JS: &str = include_str!("../assets/js/status.js");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sizes: DirSizeService,
    pub probe: Option<Arc<dyn HeaderProbe>>,
    pub tables: Option<Arc<dyn TableStatusSource>>,
    pub log_filter: Arc<str>,
}

impl AppState {
    pub fn new(config: Config, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config: Arc::new(config),
            sizes: DirSizeService::new(fs),
            probe: None,
            tables: None,
            log_filter: Arc::from("info"),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn HeaderProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_tables(mut self, tables: Arc<dyn TableStatusSource>) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn with_log_filter(mut self, filter: &str) -> Self {
        self.log_filter = Arc::from(filter);
        self
    }
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let page = dashboard::build_page(&state).await;
    Html(render_page(&page, SCRIPT_ROUTE, DIR_SIZE_ROUTE))
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        STATUS_JS,
    )
}

async fn healthz_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(SCRIPT_ROUTE, get(script_handler))
        .route(DIR_SIZE_ROUTE, get(dir_size_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "status board listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
