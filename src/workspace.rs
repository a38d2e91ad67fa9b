use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;

/// Per-job directory scoping one job's intermediate artifacts.
///
/// The identifier derives from a microsecond UTC timestamp, so concurrent
/// jobs under the same root never share a directory and no locking is
/// needed. The pipeline owns the workspace exclusively; nothing else holds
/// references to its paths across calls.
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    dir: PathBuf,
}

impl JobWorkspace {
    /// Create a fresh workspace directory under `root`
    pub async fn create(root: &Path) -> Result<Self> {
        // Microsecond timestamp plus a process-local sequence number keeps
        // identifiers distinct even for back-to-back jobs
        static SEQUENCE: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let sequence = SEQUENCE.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let micros = chrono::Utc::now().timestamp_micros();
        let dir = root.join(format!("job-{}-{}", micros, sequence));
        fs::create_dir_all(&dir).await?;
        debug!("Created job workspace: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scaled_video(&self) -> PathBuf {
        self.dir.join("scaled.mp4")
    }

    pub fn audio(&self) -> PathBuf {
        self.dir.join("audio.mp3")
    }

    pub fn captions(&self) -> PathBuf {
        self.dir.join("captions.ass")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.join("output.mp4")
    }

    /// Remove intermediate artifacts after a successful run, keeping only
    /// the burned output. Each removal is best-effort; failures are logged
    /// per file and never escalate.
    pub async fn remove_intermediates(&self, input_path: &Path) {
        for path in [
            input_path.to_path_buf(),
            self.scaled_video(),
            self.audio(),
            self.captions(),
        ] {
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Failed to delete {}: {}", path.display(), e);
            }
        }
    }

    /// Remove the whole workspace and the original input after a failure.
    /// Best-effort and tolerant of partial or missing state; the original
    /// pipeline error is what the caller sees, never a cleanup error.
    pub async fn remove_all(&self, input_path: &Path) {
        if let Err(e) = fs::remove_dir_all(&self.dir).await {
            warn!("Failed to remove workspace {}: {}", self.dir.display(), e);
        }
        if let Err(e) = fs::remove_file(input_path).await {
            warn!("Failed to delete input {}: {}", input_path.display(), e);
        }
    }
}
