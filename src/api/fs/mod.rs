// src/api/fs/mod.rs
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::api::{
    cancel::CancelFlag,
    error::{SizeError, UnreadableEntry},
};

mod memory;

pub use memory::MemoryFs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

/// One step of a traversal. Anything that is not a regular file reports `Ok(0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub size: Result<u64, UnreadableEntry>,
}

/// Read-only view of a filesystem, enough to size a directory tree.
pub trait FileSystem: Send + Sync {
    /// Kind of the entry at `path` after resolving links, `None` if absent.
    fn kind(&self, path: &Path) -> Option<EntryKind>;

    /// Every entry below `root` (not `root` itself), lazily, in no particular order.
    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkEntry> + 'a>;
}

/// The host filesystem, walked with `walkdir`. Links are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        let md = std::fs::metadata(path).ok()?;
        Some(if md.is_dir() {
            EntryKind::Directory
        } else if md.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        })
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkEntry> + 'a> {
        let root = root.to_path_buf();
        let iter = WalkDir::new(&root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .map(move |entry| match entry {
                Ok(entry) => {
                    let ft = entry.file_type();
                    let kind = if ft.is_file() {
                        EntryKind::File
                    } else if ft.is_dir() {
                        EntryKind::Directory
                    } else {
                        EntryKind::Other
                    };
                    let size = if kind == EntryKind::File {
                        entry
                            .metadata()
                            .map(|md| md.len())
                            .map_err(|e| UnreadableEntry::new(entry.path(), e))
                    } else {
                        Ok(0)
                    };
                    WalkEntry {
                        path: entry.into_path(),
                        kind,
                        size,
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(&root).to_path_buf();
                    WalkEntry {
                        size: Err(UnreadableEntry::new(&path, &err)),
                        kind: EntryKind::Other,
                        path,
                    }
                }
            });
        Box::new(iter)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkTally {
    pub bytes: u64,
    /// Regular files whose size was read.
    pub files: u64,
    pub skipped: u64,
}

/// Folds a traversal into a best-effort total: only `Ok` sizes count,
/// unreadable entries are skipped. Stops early once `cancel` is raised.
pub fn tally<I>(entries: I, cancel: &CancelFlag) -> Result<WalkTally, SizeError>
where
    I: IntoIterator<Item = WalkEntry>,
{
    let mut t = WalkTally::default();
    for entry in entries {
        if cancel.is_cancelled() {
            return Err(SizeError::Cancelled);
        }
        match entry.size {
            Ok(len) => {
                t.bytes = t.bytes.saturating_add(len);
                if entry.kind == EntryKind::File {
                    t.files += 1;
                }
            }
            Err(e) => {
                debug!(path = %entry.path.display(), error = %e.reason, "skipping unreadable entry");
                t.skipped += 1;
            }
        }
    }
    Ok(t)
}
