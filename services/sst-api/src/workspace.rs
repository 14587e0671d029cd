//! Per-request scratch directories.
//!
//! Each upload gets its own directory under the configured work dir, named
//! after a fresh request id. The directory and everything in it are removed
//! when the workspace is dropped, whichever way the request ends.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestWorkspace {
    id: Uuid,
    dir: TempDir,
}

impl RequestWorkspace {
    /// Create a workspace under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;

        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("sst-{}-", id))
            .tempdir_in(root)?;

        debug!(request_id = %id, path = %dir.path().display(), "Created request workspace");
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the workspace now, reporting any failure.
    pub fn close(self) -> io::Result<()> {
        let id = self.id;
        self.dir.close().map_err(|e| {
            warn!(request_id = %id, error = %e, "Failed to remove request workspace");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = RequestWorkspace::create(root.path()).unwrap();
            std::fs::write(ws.file("map"), b"data").unwrap();
            assert!(ws.path().exists());
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_workspace_close() {
        let root = tempfile::tempdir().unwrap();
        let ws = RequestWorkspace::create(root.path()).unwrap();
        let path = ws.path().to_path_buf();
        ws.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let root = tempfile::tempdir().unwrap();
        let a = RequestWorkspace::create(root.path()).unwrap();
        let b = RequestWorkspace::create(root.path()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(&format!("sst-{}-", a.id())));
    }

    #[test]
    fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let ws = RequestWorkspace::create(&nested).unwrap();
        assert!(ws.path().starts_with(&nested));
    }
}
