use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use af_core::ports::StatePersistencePort;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

/// One JSON file per key under a state directory (`<dir>/<key>.json`).
pub struct FileStatePersistence {
    dir: PathBuf,
}

impl FileStatePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("invalid state key: {key:?}");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Writes next to the target and renames over it, so readers see either
    /// the old snapshot or the new one.
    async fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create state dir failed: {}", self.dir.display()))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp state failed: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).await.with_context(|| {
            format!(
                "rename temp state to target failed: {} -> {}",
                tmp_path.display(),
                path.display()
            )
        })
    }
}

#[async_trait]
impl StatePersistencePort for FileStatePersistence {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read state failed: {}", path.display()))
            }
        };
        let value = serde_json::from_slice(&content)
            .with_context(|| format!("parse state failed: {}", path.display()))?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let content = serde_json::to_vec_pretty(value).context("serialize state failed")?;
        self.atomic_write(&path, &content).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove state failed: {}", path.display())),
        }
    }
}
