use std::sync::Arc;

use crate::backup::{self, DocumentPicker, PendingRestore, ShareSink};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::kv::{FileKv, KeyValueStore};
use crate::store::category::validate_entry;
use crate::store::{CategoryStore, ProfileStore, ThemeStore, TodoStore};

/// One instance per process: owns the four stores over a shared key-value
/// backend and orchestrates the flows that span more than one store.
///
/// Store operations are async but the app issues them sequentially from user
/// actions; two un-awaited mutations against the same key would race
/// (last-write-wins), which the single-interaction usage model accepts.
pub struct App {
    pub config: AppConfig,
    kv: Arc<dyn KeyValueStore>,
    pub categories: CategoryStore,
    pub todos: TodoStore,
    pub theme: ThemeStore,
    pub profile: ProfileStore,
}

impl App {
    pub fn new(config: AppConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            categories: CategoryStore::new(Arc::clone(&kv)),
            todos: TodoStore::new(Arc::clone(&kv)),
            theme: ThemeStore::new(Arc::clone(&kv)),
            profile: ProfileStore::new(Arc::clone(&kv)),
            config,
            kv,
        }
    }

    /// Open the app on the file-backed store under `config.data_dir`.
    pub fn open(config: AppConfig) -> std::io::Result<Self> {
        config.ensure_dirs()?;
        let kv = Arc::new(FileKv::new(config.store_path()));
        Ok(Self::new(config, kv))
    }

    /// Load every store from durable state. Called once at startup and again
    /// after a restore.
    pub async fn load_all(&mut self) -> Result<()> {
        self.categories.load().await?;
        self.todos.load().await?;
        self.theme.load().await?;
        self.profile.load().await?;
        Ok(())
    }

    /// Rename the category at `index`, cascading the rename through every
    /// todo that references the old name.
    ///
    /// The cascade is persisted before the category array is committed, so
    /// there is no window in which a reload would show todos under a name no
    /// longer present.
    pub async fn rename_category(
        &mut self,
        index: usize,
        new_name: &str,
        new_icon: &str,
    ) -> Result<()> {
        validate_entry(new_name, new_icon)?;
        let new_name = new_name.trim();
        let Some(old_name) = self.categories.list().get(index).map(|c| c.name.clone()) else {
            return Err(Error::Validation(format!("no category at index {index}")));
        };
        if old_name != new_name {
            self.todos
                .cascade_rename_category(&old_name, new_name)
                .await?;
        }
        self.categories.rename(index, new_name, new_icon).await
    }

    /// Delete the category at `index`; refused while any todo references it.
    pub async fn remove_category(&mut self, index: usize) -> Result<()> {
        self.categories.remove(index, self.todos.list()).await
    }

    /// Export all durable state through the platform share sheet.
    pub async fn export_backup(&self, sink: &dyn ShareSink) -> Result<()> {
        backup::export(self.kv.as_ref(), &self.config, sink).await
    }

    /// Restore, phase one: pick and validate a backup file. The returned
    /// pending restore carries the timestamp for the confirmation prompt.
    pub async fn begin_restore(&self, picker: &dyn DocumentPicker) -> Result<PendingRestore> {
        backup::begin_restore(picker).await
    }

    /// Restore, phase two: replace the persisted keys and refresh every
    /// cache so subscribers see the restored state without a restart.
    pub async fn apply_restore(&mut self, pending: PendingRestore) -> Result<()> {
        backup::apply_restore(self.kv.as_ref(), pending).await?;
        self.load_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::Theme;
    use crate::kv::MemoryKv;
    use async_trait::async_trait;
    use std::path::PathBuf;

    fn app() -> App {
        let config = AppConfig {
            data_dir: PathBuf::from("/nonexistent"),
            scratch_dir: std::env::temp_dir(),
        };
        App::new(config, Arc::new(MemoryKv::new()))
    }

    #[tokio::test]
    async fn lifecycle_scenario() {
        let mut app = app();
        app.load_all().await.unwrap();

        app.categories.add("Work", "briefcase").await.unwrap();
        let todo = app.todos.add("Write report", "Work").await.unwrap();
        assert!(!todo.completed);
        assert_eq!(todo.comment, "");
        assert!(!todo.id.is_empty());

        app.todos.toggle_complete(&todo.id).await.unwrap();
        assert!(app.todos.list()[0].completed);

        // Delete is blocked while the todo references the category.
        assert!(matches!(
            app.remove_category(0).await,
            Err(Error::CategoryNotEmpty(_))
        ));
        assert_eq!(app.categories.list().len(), 1);

        app.todos.remove(&todo.id).await.unwrap();
        app.remove_category(0).await.unwrap();
        assert!(app.categories.list().is_empty());
    }

    #[tokio::test]
    async fn rename_cascades_to_todos() {
        let mut app = app();
        app.categories.add("Work", "briefcase").await.unwrap();
        app.todos.add("Write report", "Work").await.unwrap();

        app.rename_category(0, "Job", "briefcase").await.unwrap();

        assert_eq!(app.categories.list()[0].name, "Job");
        assert_eq!(app.todos.in_category("Work").count(), 0);
        assert_eq!(app.todos.in_category("Job").count(), 1);
    }

    #[tokio::test]
    async fn rename_validation_precedes_cascade() {
        let mut app = app();
        app.categories.add("Work", "briefcase").await.unwrap();
        app.todos.add("Write report", "Work").await.unwrap();

        assert!(app.rename_category(0, "  ", "briefcase").await.is_err());
        // The cascade must not have run.
        assert_eq!(app.todos.in_category("Work").count(), 1);
    }

    struct FixedPicker(PathBuf);

    #[async_trait]
    impl DocumentPicker for FixedPicker {
        async fn pick_json(&self) -> Result<Option<PathBuf>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn restore_refreshes_every_cache() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("backup.json");
        std::fs::write(
            &file,
            r#"{
                "timestamp": "2026-08-29T12:00:00Z",
                "categories": [{"name":"Work","icon":"briefcase"}],
                "todos": [{"id":"1","name":"Write report","category":"Work","completed":true,"comment":"done"}],
                "theme": "dark"
            }"#,
        )
        .unwrap();

        let mut app = app();
        app.load_all().await.unwrap();
        app.categories.add("Scratch", "star").await.unwrap();

        let pending = app.begin_restore(&FixedPicker(file)).await.unwrap();
        assert_eq!(pending.timestamp(), "2026-08-29T12:00:00Z");
        app.apply_restore(pending).await.unwrap();

        assert_eq!(app.categories.list().len(), 1);
        assert_eq!(app.categories.list()[0].name, "Work");
        assert_eq!(app.todos.list().len(), 1);
        assert!(app.todos.list()[0].completed);
        assert_eq!(app.theme.get(), Theme::Dark);
    }
}
