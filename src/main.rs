#![forbid(unsafe_code)]

use status_lib::{
    dashboard::probe::{HeaderProbe, HttpHeaderProbe},
    AppState, Config, LocalFs,
};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Returns the filter directive in effect, for the runtime panel.
fn init_tracing() -> String {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let directive = filter.to_string();
    if env_bool("STATUS_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
    directive
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let log_filter = init_tracing();

    let config = Config::load().map_err(|e| {
        error!("configuration error: {e}");
        e.to_string()
    })?;
    for m in &config.monitored_paths {
        if !m.path.is_dir() {
            warn!(label = %m.label, path = %m.path.display(), "monitored path is not a directory");
        }
    }

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| format!("bind {}: {e}", config.bind))?;

    let probe = HttpHeaderProbe::new(config.header_timeout).map_err(|e| e.to_string())?;
    let state = AppState::new(config, Arc::new(LocalFs))
        .with_probe(Arc::new(probe) as Arc<dyn HeaderProbe>)
        .with_log_filter(&log_filter);

    status_lib::serve(listener, state, wait_for_shutdown_signal())
        .await
        .map_err(|e| e.to_string())?;

    info!("status board stopped");
    Ok(())
}
