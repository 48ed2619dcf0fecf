// src/api/dir_size.rs
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::{path::Path, sync::Arc, time::Instant};
use tracing::{info, warn};

use crate::{
    api::{
        cancel::{CancelFlag, CancelOnDrop},
        error::SizeError,
        fs::{tally, EntryKind, FileSystem, WalkTally},
        types::SizeResult,
    },
    server::AppState,
};

/// Computes recursive directory sizes on top of an injected filesystem.
/// Stateless: every call walks the tree again.
#[derive(Clone)]
pub struct DirSizeService {
    fs: Arc<dyn FileSystem>,
}

impl DirSizeService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Blocking: validates `path` and walks it.
    pub fn measure(&self, path: &str, cancel: &CancelFlag) -> Result<WalkTally, SizeError> {
        if path.is_empty() {
            return Err(SizeError::InvalidRequest);
        }
        let root = Path::new(path);
        if self.fs.kind(root) != Some(EntryKind::Directory) {
            return Err(SizeError::NotFound);
        }
        tally(self.fs.walk(root), cancel)
    }

    /// Runs [`measure`](Self::measure) off the async workers. Dropping the
    /// returned future stops the walk.
    pub async fn dir_size(&self, path: String) -> Result<SizeResult, SizeError> {
        if path.is_empty() {
            warn!("dir size requested without a path");
            return Err(SizeError::InvalidRequest);
        }

        let cancel = CancelFlag::new();
        let _guard = CancelOnDrop(cancel.clone());
        let started = Instant::now();

        let this = self.clone();
        let walked_path = path.clone();
        let outcome = tokio::task::spawn_blocking(move || this.measure(&walked_path, &cancel))
            .await
            .map_err(|e| {
                warn!(path = %path, error = %e, "dir size worker failed");
                SizeError::Internal
            })?;

        match outcome {
            Ok(t) => {
                info!(
                    path = %path,
                    bytes = t.bytes,
                    files = t.files,
                    skipped = t.skipped,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "dir size computed"
                );
                Ok(SizeResult::from_bytes(t.bytes))
            }
            Err(e) => {
                warn!(path = %path, error = %e, "dir size rejected");
                Err(e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DirSizeParams {
    #[serde(default)]
    pub path: String,
}

pub async fn dir_size_handler(
    State(state): State<AppState>,
    Query(params): Query<DirSizeParams>,
) -> Result<Json<SizeResult>, SizeError> {
    state.sizes.dir_size(params.path).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fs::{MemoryFs, WalkEntry};
    use std::{
        path::PathBuf,
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        time::Duration,
    };

    fn service(fs: MemoryFs) -> DirSizeService {
        DirSizeService::new(Arc::new(fs))
    }

    #[test]
    fn empty_path_is_invalid() {
        let svc = service(MemoryFs::new());
        assert_eq!(
            svc.measure("", &CancelFlag::new()).unwrap_err(),
            SizeError::InvalidRequest
        );
    }

    #[test]
    fn missing_or_file_path_is_not_found() {
        let svc = service(MemoryFs::new().file("/srv/notes.txt", 12));
        let cancel = CancelFlag::new();
        assert_eq!(
            svc.measure("/srv/missing", &cancel).unwrap_err(),
            SizeError::NotFound
        );
        assert_eq!(
            svc.measure("/srv/notes.txt", &cancel).unwrap_err(),
            SizeError::NotFound
        );
    }

    #[test]
    fn sums_nested_files() {
        let svc = service(
            MemoryFs::new()
                .file("/m/a", 100)
                .dir("/m/empty")
                .file("/m/deep/er/b", 250)
                .file("/m/deep/c", 650),
        );
        let t = svc.measure("/m", &CancelFlag::new()).unwrap();
        assert_eq!(t.bytes, 1000);
        assert_eq!(t.files, 3);
        assert_eq!(t.skipped, 0);
    }

    #[test]
    fn links_contribute_nothing() {
        let svc = service(MemoryFs::new().file("/m/a", 10).symlink("/m/link-to-a"));
        assert_eq!(svc.measure("/m", &CancelFlag::new()).unwrap().bytes, 10);
    }

    /// Endless tree that yields one empty file per millisecond.
    struct Bottomless {
        yielded: Arc<AtomicUsize>,
        finished: Arc<AtomicBool>,
    }

    struct Drip {
        yielded: Arc<AtomicUsize>,
        finished: Arc<AtomicBool>,
    }

    impl Iterator for Drip {
        type Item = WalkEntry;

        fn next(&mut self) -> Option<WalkEntry> {
            std::thread::sleep(Duration::from_millis(1));
            let n = self.yielded.fetch_add(1, Ordering::SeqCst);
            Some(WalkEntry {
                path: PathBuf::from(format!("/deep/{n}")),
                kind: EntryKind::File,
                size: Ok(0),
            })
        }
    }

    impl Drop for Drip {
        fn drop(&mut self) {
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    impl FileSystem for Bottomless {
        fn kind(&self, _path: &Path) -> Option<EntryKind> {
            Some(EntryKind::Directory)
        }

        fn walk<'a>(&'a self, _root: &Path) -> Box<dyn Iterator<Item = WalkEntry> + 'a> {
            Box::new(Drip {
                yielded: self.yielded.clone(),
                finished: self.finished.clone(),
            })
        }
    }

    #[tokio::test]
    async fn dropping_the_request_stops_the_walk() {
        let yielded = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let svc = DirSizeService::new(Arc::new(Bottomless {
            yielded: yielded.clone(),
            finished: finished.clone(),
        }));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), svc.dir_size("/deep".to_string()))
                .await;
        assert!(abandoned.is_err());

        let deadline = Instant::now() + Duration::from_secs(2);
        while !finished.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "walk kept running after drop");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let at_stop = yielded.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(yielded.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test]
    async fn async_wrapper_returns_wire_result() {
        let svc = service(MemoryFs::new().file("/m/a", 2048));
        let r = svc.dir_size("/m".to_string()).await.unwrap();
        assert_eq!(r, SizeResult::from_bytes(2048));
    }
}
