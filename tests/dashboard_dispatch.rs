use async_trait::async_trait;
use status_lib::{
    build_router,
    dashboard::{
        build_page,
        panels::{TableStatus, TableStatusSource},
        probe::{HeaderProbe, ProbeError},
        Cell, Page,
    },
    resolve_page, AppState, Config, DispatchError, HttpSizeSource, LocalFs, MonitoredPath,
    SizeResult, SizeSource,
};
use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
    path::Path,
    sync::Arc,
    time::Duration,
};
use tempfile::tempdir;
use tokio::net::TcpListener;

async fn spawn_app(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve app")
    });
    addr
}

fn config_for(monitored: Vec<MonitoredPath>) -> Config {
    let mut cfg = Config::defaults(Path::new("/srv"));
    cfg.monitored_paths = monitored;
    cfg
}

fn rows_of(page: &Page) -> Vec<(String, Cell)> {
    page.sections()[0]
        .rows
        .iter()
        .map(|r| (r.title.clone(), r.value.clone()))
        .collect()
}

#[tokio::test]
async fn one_failed_query_drops_only_its_row() {
    let root = tempdir().expect("tempdir");
    let mut monitored = Vec::new();
    for (label, len) in [("media", 1024 * 1024), ("data", 2 * 1024 * 1024), ("src", 0)] {
        let dir = root.path().join(label);
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("blob"), vec![0u8; len]).unwrap();
        monitored.push(MonitoredPath::new(label, dir));
    }
    // never created, so the server answers 404 for it
    monitored.push(MonitoredPath::new("cache", root.path().join("cache")));

    let state = AppState::new(config_for(monitored), Arc::new(LocalFs));
    let addr = spawn_app(state.clone()).await;

    let mut page = build_page(&state).await;
    assert_eq!(page.placeholders().len(), 4);

    let source = HttpSizeSource::new(&format!("http://{addr}")).expect("client");
    let summary = resolve_page(&mut page, "it-fan-out", Arc::new(source))
        .await
        .expect("dispatch");

    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.dropped, 1);
    assert!(page.placeholders().is_empty());
    assert_eq!(
        rows_of(&page),
        vec![
            (
                "media directory size".to_string(),
                Cell::Text("1.00 MB".to_string())
            ),
            (
                "data directory size".to_string(),
                Cell::Text("2.00 MB".to_string())
            ),
            (
                "src directory size".to_string(),
                Cell::Text("0.00 MB".to_string())
            ),
        ]
    );
}

/// Answers each path after its own delay, failing the ones marked as broken.
struct Staggered {
    delays_ms: HashMap<String, u64>,
    broken: Vec<String>,
}

#[async_trait]
impl SizeSource for Staggered {
    async fn query(&self, path: &str) -> Result<SizeResult, DispatchError> {
        let delay = self.delays_ms.get(path).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if self.broken.iter().any(|b| b == path) {
            return Err(DispatchError::Transport("connection reset".to_string()));
        }
        Ok(SizeResult::from_bytes(delay * 1024 * 1024))
    }
}

#[tokio::test]
async fn answers_land_on_their_own_rows_whatever_the_order() {
    let mut page = Page::new();
    page.push_section(
        "Sizes",
        ["/slow", "/fast", "/broken", "/medium"]
            .into_iter()
            .map(|p| {
                (
                    p.to_string(),
                    Cell::Pending {
                        path: p.to_string(),
                    },
                )
            })
            .collect(),
    );

    let source = Staggered {
        delays_ms: HashMap::from([
            ("/slow".to_string(), 60),
            ("/fast".to_string(), 5),
            ("/broken".to_string(), 20),
            ("/medium".to_string(), 30),
        ]),
        broken: vec!["/broken".to_string()],
    };

    let summary = resolve_page(&mut page, "it-staggered", Arc::new(source))
        .await
        .expect("dispatch");
    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.dropped, 1);
    assert_eq!(
        rows_of(&page),
        vec![
            ("/slow".to_string(), Cell::Text("60.00 MB".to_string())),
            ("/fast".to_string(), Cell::Text("5.00 MB".to_string())),
            ("/medium".to_string(), Cell::Text("30.00 MB".to_string())),
        ]
    );
}

#[tokio::test]
async fn malformed_body_counts_as_failure() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = axum::Router::new().route(
        "/api/status/dir-size",
        axum::routing::get(|| async { "not json" }),
    );
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    let source = HttpSizeSource::new(&format!("http://{addr}")).expect("client");
    let err = source.query("/anything").await.unwrap_err();
    assert!(matches!(err, DispatchError::Body(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        l.local_addr().expect("addr")
    };
    let source = HttpSizeSource::new(&format!("http://{addr}")).expect("client");
    let err = source.query("/srv").await.unwrap_err();
    assert!(matches!(err, DispatchError::Transport(_)));
}

struct FixedHeaders(Vec<(String, String)>);

#[async_trait]
impl HeaderProbe for FixedHeaders {
    async fn fetch(&self, _url: &str) -> Result<Vec<(String, String)>, ProbeError> {
        Ok(self.0.clone())
    }
}

struct DownProbe;

#[async_trait]
impl HeaderProbe for DownProbe {
    async fn fetch(&self, url: &str) -> Result<Vec<(String, String)>, ProbeError> {
        Err(ProbeError::Request {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

struct OneTable;

impl TableStatusSource for OneTable {
    fn table_status(&self) -> Result<Vec<TableStatus>, String> {
        Ok(vec![TableStatus {
            name: "article".to_string(),
            data_length: 3 * 1024 * 1024,
            index_length: 1024 * 1024,
        }])
    }
}

#[tokio::test]
async fn dashboard_renders_placeholders_and_panels() {
    let mut cfg = config_for(vec![MonitoredPath::new("media", "/srv/media")]);
    cfg.site_url = Some("https://example.org/".to_string());
    cfg.constants = BTreeMap::from([("APP_ENV".to_string(), "staging".to_string())]);

    let state = AppState::new(cfg, Arc::new(LocalFs))
        .with_probe(Arc::new(FixedHeaders(vec![(
            "x-content-type-options".to_string(),
            "nosniff".to_string(),
        )])))
        .with_tables(Arc::new(OneTable));
    let addr = spawn_app(state).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.expect("get page");
    assert_eq!(resp.status().as_u16(), 200);
    let html = resp.text().await.expect("html body");

    assert!(html.contains("<span class=\"dir-size\" data-path=\"/srv/media\">"));
    assert!(html.contains("<th>Database size</th><td>4.00 MB</td>"));
    assert!(html.contains("<th>X-Content-Type-Options</th><td class=\"ok\">OK</td>"));
    assert!(html.contains("<th>X-Frame-Options</th><td class=\"fail\">Not present</td>"));
    assert!(html.contains("<th>APP_ENV</th><td>staging</td>"));
    assert!(html.contains("Server runtime"));
    assert!(html.contains("<script src=\"/assets/status.js\" defer></script>"));
}

#[tokio::test]
async fn failed_header_probe_shows_a_single_row() {
    let mut cfg = config_for(Vec::new());
    cfg.site_url = Some("https://example.invalid/".to_string());
    let state = AppState::new(cfg, Arc::new(LocalFs)).with_probe(Arc::new(DownProbe));

    let page = build_page(&state).await;
    let titles: Vec<_> = page.sections().iter().map(|s| s.title.as_str()).collect();
    assert!(titles.contains(&"Response headers"));
    assert!(!titles.contains(&"Security headers"));
}

#[tokio::test]
async fn no_site_url_means_no_header_panels() {
    let state = AppState::new(config_for(Vec::new()), Arc::new(LocalFs))
        .with_probe(Arc::new(DownProbe));
    let page = build_page(&state).await;
    let titles: Vec<_> = page.sections().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Directory and database sizes", "Server runtime", "Constants"]
    );
}

#[tokio::test]
async fn script_and_health_routes_are_served() {
    let state = AppState::new(config_for(Vec::new()), Arc::new(LocalFs));
    let addr = spawn_app(state).await;

    let js = reqwest::get(format!("http://{addr}/assets/status.js"))
        .await
        .expect("get script");
    assert_eq!(js.status().as_u16(), 200);
    assert!(js
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/javascript")));
    let body = js.text().await.expect("script body");
    assert!(body.contains("querySelectorAll('.dir-size')"));
    assert!(body.contains("closest('tr')"));

    let health: serde_json::Value = reqwest::get(format!("http://{addr}/healthz"))
        .await
        .expect("get healthz")
        .json()
        .await
        .expect("health json");
    assert_eq!(health["status"], "ok");
}
