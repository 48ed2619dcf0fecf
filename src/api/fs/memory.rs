// src/api/fs/memory.rs
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use super::{EntryKind, FileSystem, WalkEntry};
use crate::api::error::UnreadableEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File(u64),
    Symlink,
    Unreadable,
}

/// In-memory tree. Entries are enumerated in the order they were added,
/// so callers control the traversal order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    nodes: Vec<(PathBuf, Node)>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(self, path: impl Into<PathBuf>) -> Self {
        self.with(path.into(), Node::Dir)
    }

    pub fn file(self, path: impl Into<PathBuf>, len: u64) -> Self {
        self.with(path.into(), Node::File(len))
    }

    /// A link entry. It is never followed.
    pub fn symlink(self, path: impl Into<PathBuf>) -> Self {
        self.with(path.into(), Node::Symlink)
    }

    /// An entry that cannot be stat'd. Anything below it is unreachable.
    pub fn unreadable(self, path: impl Into<PathBuf>) -> Self {
        self.with(path.into(), Node::Unreadable)
    }

    fn with(mut self, path: PathBuf, node: Node) -> Self {
        match self.nodes.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = node,
            None => self.nodes.push((path, node)),
        }
        self
    }
}

impl FileSystem for MemoryFs {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        if let Some((_, node)) = self.nodes.iter().find(|(p, _)| p == path) {
            return Some(match node {
                Node::Dir => EntryKind::Directory,
                Node::File(_) => EntryKind::File,
                Node::Symlink | Node::Unreadable => EntryKind::Other,
            });
        }
        // parents of registered entries exist implicitly
        self.nodes
            .iter()
            .any(|(p, _)| p != path && p.starts_with(path))
            .then_some(EntryKind::Directory)
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkEntry> + 'a> {
        let root = root.to_path_buf();
        let blocked: HashSet<&Path> = self
            .nodes
            .iter()
            .filter(|(_, n)| *n == Node::Unreadable)
            .map(|(p, _)| p.as_path())
            .collect();

        let iter = self
            .nodes
            .iter()
            .filter(move |(p, _)| {
                if *p == root || !p.starts_with(&root) {
                    return false;
                }
                !p.ancestors()
                    .skip(1)
                    .take_while(|a| *a != root.as_path())
                    .any(|a| blocked.contains(a))
            })
            .map(|(p, node)| WalkEntry {
                path: p.clone(),
                kind: match node {
                    Node::Dir => EntryKind::Directory,
                    Node::File(_) => EntryKind::File,
                    Node::Symlink | Node::Unreadable => EntryKind::Other,
                },
                size: match node {
                    Node::File(len) => Ok(*len),
                    Node::Dir | Node::Symlink => Ok(0),
                    Node::Unreadable => Err(UnreadableEntry::new(p, "Permission denied")),
                },
            });
        Box::new(iter)
    }
}
