//! Per-request scratch directories.
//!
//! Creating and deleting a checkout with its `node_modules` is slow blocking
//! filesystem work, so both run on tokio's blocking pool.

use std::io;
use std::path::{Path, PathBuf};

use tokio::task;
use vessel_bundler::IdSource;

const PREFIX: &str = "vessel";
const SUFFIX_LEN: usize = 8;

/// A uniquely named directory that is removed recursively once the request
/// is done with it.
///
/// [`ScratchDir::remove`] deletes it and waits for the deletion. A directory
/// that is dropped instead (a cancelled or timed out request) is deleted in
/// the background.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Create `<parent>/vessel-<unix millis>-<id>`.
    pub async fn create(parent: &Path, ids: &dyn IdSource) -> io::Result<Self> {
        let name = format!(
            "{}-{}-{}",
            PREFIX,
            chrono::Utc::now().timestamp_millis(),
            ids.next_id(SUFFIX_LEN)
        );
        let parent = parent.to_path_buf();
        let path = parent.join(name);

        let created = path.clone();
        task::spawn_blocking(move || {
            std::fs::create_dir_all(&parent)?;
            std::fs::create_dir(&created)
        })
        .await
        .map_err(|e| io::Error::other(format!("Task join error: {}", e)))??;

        tracing::debug!(path = %path.display(), "Created workspace directory");
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory tree and wait until it is gone.
    pub async fn remove(mut self) {
        self.armed = false;
        let path = self.path.clone();
        if let Err(e) = task::spawn_blocking(move || remove_tree(&path)).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Workspace cleanup task failed");
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_tree(&path));
            }
            Err(_) => remove_tree(&path),
        }
    }
}

fn remove_tree(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed workspace directory"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove workspace directory"
        ),
    }
}
