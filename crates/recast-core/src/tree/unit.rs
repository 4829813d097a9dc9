use crate::tree::{Node, P};
use std::path::{Path, PathBuf};

/// One parsed source unit: a root node plus the logical path identifying it.
///
/// Units are produced by the external parser collaborator and re-emitted by
/// the external printer; the engine only needs structural equality and
/// reference identity on the root.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceUnit {
    path: PathBuf,
    root: P<Node>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, root: P<Node>) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &P<Node> {
        &self.root
    }

    /// Same unit identity, new root. Used by the engine when a cycle
    /// produced a replacement tree.
    pub fn with_root(&self, root: P<Node>) -> Self {
        Self {
            path: self.path.clone(),
            root,
        }
    }

    /// Structural equality on the roots; independent of node ids.
    pub fn structurally_equal(&self, other: &SourceUnit) -> bool {
        self.root == other.root
    }
}
