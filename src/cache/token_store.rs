use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Durable key-value surface the token manager persists tokens into.
pub trait TokenStore: Send + Sync {
    /// Returns `None` when nothing (or an empty value) is stored at `key`.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Whole-value replacement of whatever is stored at `key`.
    fn write(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Creates the backing container (directory, table, ...) if absent.
    fn ensure_container(&self) -> impl Future<Output = Result<()>> + Send;
}

/// One file per credential pair inside `dir`, named by the cache key.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(anyhow!("invalid token store key '{}'", key));
        }
        Ok(self.dir.join(key))
    }
}

impl TokenStore for FileTokenStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let content = content.trim_end();
                if content.is_empty() {
                    debug!("token file '{}' is empty", path.display());
                    return Ok(None);
                }
                Ok(Some(content.to_owned()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(anyhow!("read '{}': {}", path.display(), err)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.ensure_container().await?;

        // tmp -> rename keeps readers from ever seeing a half written token,
        // tmp names are unique so concurrent writers never share one
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{}.{}.{}.tmp", key, std::process::id(), seq));
        fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|err| anyhow!("write '{}': {}", tmp.display(), err))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        fs::rename(&tmp, &path)
            .await
            .map_err(|err| anyhow!("rename '{}' -> '{}': {}", tmp.display(), path.display(), err))?;
        debug!("token persisted to '{}'", path.display());
        Ok(())
    }

    async fn ensure_container(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| anyhow!("create '{}': {}", self.dir.display(), err))
    }
}

/// Process-local store, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `write` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, key: &str, value: &str) {
        self.inner.write().await.insert(key.to_owned(), value.to_owned());
    }
}

impl TokenStore for MemoryTokenStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .inner
            .read()
            .await
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.inner.write().await.insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ensure_container(&self) -> Result<()> {
        Ok(())
    }
}
