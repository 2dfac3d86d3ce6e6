//! Checkpoint persistence
//!
//! A run overwrites a single `checkpoint.json` in place. Writes go to a temp
//! file that is synced and renamed over the previous snapshot, so a crash
//! leaves either the old or the new snapshot on disk, never a torn one.

pub mod snapshot;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub use snapshot::{AcceptedEntry, RejectedEntry, Snapshot, SnapshotSummary};

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the checkpoint with `snapshot`
    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create checkpoint directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write snapshot")?;
        file.sync_all()
            .await
            .context("Failed to sync snapshot to disk")?;

        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(
            target: "sitemirror::checkpoint",
            "Saved snapshot: {} accepted, {} rejected, {} failed",
            snapshot.summary.accepted,
            snapshot.summary.rejected,
            snapshot.summary.failed
        );
        Ok(())
    }

    /// Load the last snapshot
    ///
    /// A missing, unreadable or malformed file means there is no prior state.
    pub async fn load(&self) -> Option<Snapshot> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "sitemirror::checkpoint", "No checkpoint at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    target: "sitemirror::checkpoint",
                    "Cannot read checkpoint {}: {e}, starting fresh",
                    self.path.display()
                );
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    target: "sitemirror::checkpoint",
                    "Resuming from checkpoint of {}: {} accepted, {} rejected, {} failed",
                    snapshot.timestamp,
                    snapshot.accepted.len(),
                    snapshot.rejected.len(),
                    snapshot.failed.len()
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!(
                    target: "sitemirror::checkpoint",
                    "Malformed checkpoint {}: {e}, starting fresh",
                    self.path.display()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl_engine::crawl_types::DiscoverySource;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            summary: SnapshotSummary {
                tested: 2,
                accepted: 1,
                rejected: 1,
                failed: 0,
                success_rate: 50.0,
            },
            accepted: vec![AcceptedEntry {
                url: "hist0304/".to_string(),
                title: "History".to_string(),
                content_length: 1200,
                section: "hist0304".to_string(),
                page_number: 0,
                source: DiscoverySource::PatternGuess,
                local_file: Some("hist0304.html".to_string()),
                link_base: None,
            }],
            rejected: vec![RejectedEntry {
                url: "hist0405/".to_string(),
                reason: "Empty content".to_string(),
            }],
            failed: Vec::new(),
            sections: Vec::new(),
            pending: vec!["videos.html".to_string()],
            asset_map: BTreeMap::from([(
                "images/logo.gif".to_string(),
                "../assets/images/img1_0a1b2c3d.gif".to_string(),
            )]),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let saved = snapshot();
        store.save(&saved).await.unwrap();

        assert_eq!(store.load().await, Some(saved));
        assert!(!dir.path().join("checkpoint.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&snapshot()).await.unwrap();
        let mut newer = snapshot();
        newer.summary.tested = 10;
        store.save(&newer).await.unwrap();

        assert_eq!(store.load().await.unwrap().summary.tested, 10);
    }

    #[tokio::test]
    async fn test_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        CheckpointStore::new(&path).save(&snapshot()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        for key in ["\"successRate\"", "\"contentLength\"", "\"pageNumber\"", "\"localFile\"", "\"assetMap\"", "\"pattern-guess\""] {
            assert!(raw.contains(key), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_missing_or_malformed_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        assert_eq!(store.load().await, None);

        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().await, None);
    }
}
