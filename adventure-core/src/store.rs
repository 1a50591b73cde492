//! World document persistence.
//!
//! The [`WorldStore`] is the single source of truth for the
//! [`WorldDocument`]: one fixed file path, whole-document reads and
//! writes. Loading is fail-soft: a missing or corrupt file is
//! replaced by the built-in default scenario rather than surfaced as
//! an error, so state retrieval never blocks narrative progress.
//! Saving logs and swallows failures: by the time a save runs the
//! operation has already succeeded in memory, and availability is
//! deliberately preferred over durability here.

use crate::world::WorldDocument;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

/// Errors from reading or writing the backing file. Internal: the
/// public surface resolves every failure fail-soft.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Owns the canonical world document and its backing file.
#[derive(Debug, Clone)]
pub struct WorldStore {
    path: PathBuf,
}

impl WorldStore {
    /// Create a store backed by the given file path. The file need
    /// not exist yet; the first load creates it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current document.
    ///
    /// A missing file synthesizes the default world, persists it, and
    /// returns it. Unreadable or undeserializable content is treated
    /// the same way: the default world replaces it.
    pub async fn load(&self) -> WorldDocument {
        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "world file corrupt, resetting to default");
                    self.reset_to_default().await
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "creating default world file");
                self.reset_to_default().await
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "world file unreadable, resetting to default");
                self.reset_to_default().await
            }
        }
    }

    /// Persist the full document, replacing any prior version.
    /// Failures are logged and swallowed.
    pub async fn save(&self, doc: &WorldDocument) {
        if let Err(err) = self.write(doc).await {
            error!(path = %self.path.display(), %err, "failed to save world state");
        }
    }

    async fn reset_to_default(&self) -> WorldDocument {
        let doc = WorldDocument::default_world();
        self.save(&doc).await;
        doc
    }

    async fn write(&self, doc: &WorldDocument) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_creates_default() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("world_state.json");
        let store = WorldStore::new(&path);

        let doc = store.load().await;
        assert_eq!(doc.player.location, "foyer");
        assert!(path.exists(), "default world should be persisted");
    }

    #[tokio::test]
    async fn test_corrupt_file_resets_to_default() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("world_state.json");
        std::fs::write(&path, "{ not json").expect("write corrupt file");

        let store = WorldStore::new(&path);
        let doc = store.load().await;
        assert_eq!(doc.player.location, "foyer");

        // The reset is persisted: a second load parses cleanly.
        let again = store.load().await;
        assert_eq!(again.player.location, "foyer");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let store = WorldStore::new(dir.path().join("world_state.json"));

        let mut doc = store.load().await;
        doc.player.location = "study".to_string();
        doc.player.inventory.push("silver_key".to_string());
        store.save(&doc).await;

        let loaded = store.load().await;
        assert_eq!(loaded.player.location, "study");
        assert_eq!(loaded.player.inventory, vec!["silver_key".to_string()]);
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("saves").join("world_state.json");
        let store = WorldStore::new(&path);

        store.save(&WorldDocument::default_world()).await;
        assert!(path.exists());
    }
}
