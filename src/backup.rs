use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::config::AppConfig;
use crate::core::theme::Theme;
use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::store::{CATEGORIES_KEY, THEME_KEY, TODOS_KEY};

/// Platform share sheet. The destination of a shared file is entirely under
/// the user's/OS's control.
#[async_trait]
pub trait ShareSink: Send + Sync {
    async fn share(&self, path: &Path) -> Result<()>;
}

/// Platform document picker. `Ok(None)` means the user dismissed it.
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    async fn pick_json(&self) -> Result<Option<PathBuf>>;
}

/// Point-in-time snapshot of all three persisted stores.
///
/// `categories` and `todos` are carried as raw JSON arrays: element shape is
/// not deeply validated on import, and restored arrays are written back
/// verbatim. A later `load()` treats unparseable contents as empty.
#[derive(Debug, Clone, Serialize)]
pub struct BackupDocument {
    pub timestamp: String,
    pub categories: Value,
    pub todos: Value,
    pub theme: Theme,
}

impl BackupDocument {
    /// Assemble a snapshot from durable state, bypassing the in-memory
    /// caches so the export reflects exactly what is on disk.
    pub async fn snapshot(kv: &dyn KeyValueStore) -> Result<Self> {
        let values = kv
            .multi_get(&[CATEGORIES_KEY, TODOS_KEY, THEME_KEY])
            .await?;
        let [categories, todos, theme] = values.as_slice() else {
            return Err(Error::Persistence("short multi_get response".into()));
        };
        Ok(Self {
            timestamp: Utc::now().to_rfc3339(),
            categories: parse_array(categories.as_deref())?,
            todos: parse_array(todos.as_deref())?,
            theme: theme
                .as_deref()
                .and_then(Theme::from_str)
                .unwrap_or_default(),
        })
    }

    /// Parse and shape-validate an externally supplied document. A document
    /// failing any check is rejected in its entirety.
    pub fn parse(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| Error::InvalidBackup(format!("not valid JSON: {e}")))?;

        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidBackup("missing timestamp".into()))?
            .to_owned();
        let categories = value.get("categories").cloned().unwrap_or(Value::Null);
        if !categories.is_array() {
            return Err(Error::InvalidBackup("categories is not an array".into()));
        }
        let todos = value.get("todos").cloned().unwrap_or(Value::Null);
        if !todos.is_array() {
            return Err(Error::InvalidBackup("todos is not an array".into()));
        }
        let theme = value
            .get("theme")
            .and_then(Value::as_str)
            .and_then(Theme::from_str)
            .ok_or_else(|| Error::InvalidBackup("theme must be \"light\" or \"dark\"".into()))?;

        Ok(Self {
            timestamp,
            categories,
            todos,
            theme,
        })
    }
}

fn parse_array(raw: Option<&str>) -> Result<Value> {
    match raw {
        Some(s) => {
            let value: Value = serde_json::from_str(s)?;
            Ok(value)
        }
        None => Ok(Value::Array(Vec::new())),
    }
}

/// Export: snapshot durable state, write a scratch file, hand it to the
/// share sheet. The scratch file is single-use and removed afterwards
/// (best-effort) whatever the outcome.
pub async fn export(
    kv: &dyn KeyValueStore,
    config: &AppConfig,
    sink: &dyn ShareSink,
) -> Result<()> {
    let doc = BackupDocument::snapshot(kv).await?;
    let file_name = format!("backup-{}.json", doc.timestamp.replace([':', '.'], "-"));
    let path = config.scratch_dir.join(file_name);

    let shared = write_and_share(&doc, &path, sink).await;

    if let Err(e) = fs::remove_file(&path).await {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("failed to remove backup scratch file: {e}");
        }
    }
    shared
}

async fn write_and_share(doc: &BackupDocument, path: &Path, sink: &dyn ShareSink) -> Result<()> {
    let contents = serde_json::to_string_pretty(doc)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    sink.share(path).await
}

/// A parsed, shape-validated backup awaiting the user's explicit "this will
/// overwrite all current data" confirmation. Nothing has been mutated yet.
#[derive(Debug)]
pub struct PendingRestore {
    doc: BackupDocument,
}

impl PendingRestore {
    /// Shown to the user in the confirmation prompt.
    pub fn timestamp(&self) -> &str {
        &self.doc.timestamp
    }
}

/// Restore, phase one: pick a file, read it, parse and validate. No store is
/// touched. Cancelling the picker yields `Error::Cancelled`.
pub async fn begin_restore(picker: &dyn DocumentPicker) -> Result<PendingRestore> {
    let Some(path) = picker.pick_json().await? else {
        return Err(Error::Cancelled);
    };
    let contents = fs::read_to_string(&path)
        .await
        .map_err(|e| Error::InvalidBackup(format!("failed to read backup file: {e}")))?;
    let doc = BackupDocument::parse(&contents)?;
    Ok(PendingRestore { doc })
}

/// Restore, phase two (post-confirmation): clear the three persisted keys,
/// then write the three new values as one batched multi-write.
///
/// Clear-then-write is not a true transaction: a failure between the two
/// calls can leave the persisted keys inconsistent. Callers must refresh
/// every store cache on success (see `App::apply_restore`).
pub async fn apply_restore(kv: &dyn KeyValueStore, pending: PendingRestore) -> Result<()> {
    let doc = pending.doc;
    kv.multi_remove(&[CATEGORIES_KEY, TODOS_KEY, THEME_KEY])
        .await?;
    kv.multi_set(&[
        (CATEGORIES_KEY, serde_json::to_string(&doc.categories)?),
        (TODOS_KEY, serde_json::to_string(&doc.todos)?),
        (THEME_KEY, doc.theme.as_str().to_owned()),
    ])
    .await
}
