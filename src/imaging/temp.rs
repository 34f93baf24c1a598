//! Scoped temporary files for bridging byte buffers to a file-based tool.
//!
//! A [`TempStore`] owns the resolved temp root and hands out fresh paths named
//! by random v4 UUIDs, so concurrent calls sharing one root never collide and
//! no locking is needed. Paths are only *named* here; whether a file comes to
//! exist depends on whoever writes it (our input writer or the external tool).
//!
//! Every path handed out through a [`TempScope`] is deleted when the scope is
//! dropped, on success, on error, and when the owning future is cancelled.
//! Deletion is best-effort: a file that was never created is fine, and any
//! other failure is logged and swallowed so it can never mask the call's
//! primary result or error.

use super::pipeline::MagickError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Allocator of collision-free temp paths under one root directory.
///
/// Cheap to clone; clones share the root.
#[derive(Debug, Clone)]
pub struct TempStore {
    root: Arc<Path>,
}

impl TempStore {
    /// Create a store rooted at an already-resolved directory.
    ///
    /// Environment lookup is not done here; see
    /// [`resolve_temp_dir`](crate::config::resolve_temp_dir).
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MagickError> {
        let root: PathBuf = root.into();
        if root.as_os_str().is_empty() {
            return Err(MagickError::Configuration(
                "temp directory must not be empty".into(),
            ));
        }
        Ok(Self {
            root: Arc::from(root.into_boxed_path()),
        })
    }

    /// The resolved temp root.
    pub fn directory(&self) -> &Path {
        &self.root
    }

    /// A fresh path under the root. The file is not created.
    pub fn allocate_path(&self) -> PathBuf {
        self.root.join(Uuid::new_v4().to_string())
    }

    /// Open a scope whose paths are removed when it is dropped.
    pub fn scope(&self) -> TempScope {
        TempScope {
            store: self.clone(),
            paths: Vec::new(),
        }
    }
}

/// Tracks the paths allocated for one call and removes them on drop.
#[derive(Debug)]
pub struct TempScope {
    store: TempStore,
    paths: Vec<PathBuf>,
}

impl TempScope {
    /// Allocate a path and register it for cleanup.
    pub fn allocate_path(&mut self) -> PathBuf {
        let path = self.store.allocate_path();
        debug!(path = %path.display(), "allocated temp path");
        self.paths.push(path.clone());
        path
    }

    /// Paths allocated so far, in allocation order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for TempScope {
    fn drop(&mut self) {
        // Synchronous removal: it must also run when a future is dropped
        // mid-await, where no executor is available to drive async IO.
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed temp file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
            }
        }
    }
}
