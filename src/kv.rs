use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{Error, Result};

/// Async, string-keyed, string-valued persistent store. Durable across app
/// restarts. One mutation in flight at a time by convention; the backend does
/// not enforce it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;
    /// All pairs land in one durable write.
    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<()>;
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

/// File-backed store: all keys live in a single JSON object file, rewritten
/// whole on every mutation. Adequate for tens-to-hundreds of small values.
pub struct FileKv {
    path: PathBuf,
}

impl FileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path).await?;
        if contents.is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| Error::Persistence(format!("corrupt store file: {e}")))
    }

    async fn save(&self, data: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.load().await?;
        data.insert(key.to_owned(), value.to_owned());
        self.save(&data).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.load().await?;
        if data.remove(key).is_some() {
            self.save(&data).await?;
        }
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let data = self.load().await?;
        Ok(keys.iter().map(|k| data.get(*k).cloned()).collect())
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<()> {
        let mut data = self.load().await?;
        for (key, value) in pairs {
            data.insert((*key).to_owned(), value.clone());
        }
        self.save(&data).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut data = self.load().await?;
        let mut changed = false;
        for key in keys {
            changed |= data.remove(*key).is_some();
        }
        if changed {
            self.save(&data).await?;
        }
        Ok(())
    }
}

/// In-memory backend for tests and previews. `set_fail_writes(true)` makes
/// every mutation report a persistence failure, for exercising the
/// cache-stays-put error contract.
#[derive(Default)]
pub struct MemoryKv {
    data: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::Persistence("write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.data
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let data = self.data.lock().unwrap();
        Ok(keys.iter().map(|k| data.get(*k).cloned()).collect())
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<()> {
        self.check_writable()?;
        let mut data = self.data.lock().unwrap();
        for (key, value) in pairs {
            data.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        self.check_writable()?;
        let mut data = self.data.lock().unwrap();
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_kv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("store.json"));

        assert_eq!(kv.get("theme").await.unwrap(), None);
        kv.set("theme", "dark").await.unwrap();
        assert_eq!(kv.get("theme").await.unwrap(), Some("dark".into()));

        kv.multi_set(&[("a", "1".into()), ("b", "2".into())])
            .await
            .unwrap();
        let got = kv.multi_get(&["a", "b", "missing"]).await.unwrap();
        assert_eq!(got, vec![Some("1".into()), Some("2".into()), None]);

        kv.multi_remove(&["a", "theme"]).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap(), None);
        assert_eq!(kv.get("b").await.unwrap(), Some("2".into()));
    }

    #[tokio::test]
    async fn file_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        FileKv::new(&path).set("k", "v").await.unwrap();
        let reopened = FileKv::new(&path);
        assert_eq!(reopened.get("k").await.unwrap(), Some("v".into()));
    }

    #[tokio::test]
    async fn memory_kv_failure_injection() {
        let kv = MemoryKv::new();
        kv.set("k", "v").await.unwrap();
        kv.set_fail_writes(true);
        assert!(kv.set("k", "w").await.is_err());
        kv.set_fail_writes(false);
        assert_eq!(kv.get("k").await.unwrap(), Some("v".into()));
    }
}
