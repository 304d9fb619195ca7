use std::sync::Arc;

use crate::core::todo::Todo;
use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::store::{Listeners, TODOS_KEY};

/// Owns the to-do item list, persisted as one JSON-encoded array under the
/// `todoItems` key.
///
/// Every mutation follows the same shape: clone the cached array, compute the
/// new value, persist the whole array, then swap the cache and notify
/// subscribers. Whole-collection rewrites are O(n) per mutation, which is
/// fine for the tens-to-low-hundreds of items this store sees.
pub struct TodoStore {
    kv: Arc<dyn KeyValueStore>,
    cache: Vec<Todo>,
    listeners: Listeners,
}

impl TodoStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            cache: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn list(&self) -> &[Todo] {
        &self.cache
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Refresh the cache from the persisted array. An absent key and an
    /// unparseable value both load as empty.
    pub async fn load(&mut self) -> Result<()> {
        let todos = match self.kv.get(TODOS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("discarding unparseable todo array: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.commit(todos);
        Ok(())
    }

    /// Append a new todo with a fresh id, `completed = false` and an empty
    /// comment. Resolving `category` to an existing category is the caller's
    /// job; this store only records the name it is given.
    pub async fn add(&mut self, name: &str, category: &str) -> Result<Todo> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("todo name is required".into()));
        }
        let todo = Todo::new(name, category);
        let mut todos = self.cache.clone();
        todos.push(todo.clone());
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(todo)
    }

    /// Flip `completed` on the matching todo. Unknown ids are a no-op.
    pub async fn toggle_complete(&mut self, id: &str) -> Result<()> {
        if !self.cache.iter().any(|t| t.id == id) {
            log::warn!("toggle_complete: no todo with id {id}");
            return Ok(());
        }
        let mut todos = self.cache.clone();
        for todo in &mut todos {
            if todo.id == id {
                todo.completed = !todo.completed;
            }
        }
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(())
    }

    /// Replace name and comment on the matching todo.
    pub async fn edit(&mut self, id: &str, new_name: &str, new_comment: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::Validation("todo name is required".into()));
        }
        let mut todos = self.cache.clone();
        for todo in &mut todos {
            if todo.id == id {
                todo.name = new_name.to_owned();
                todo.comment = new_comment.to_owned();
            }
        }
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(())
    }

    /// Remove the single matching todo.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        let mut todos = self.cache.clone();
        todos.retain(|t| t.id != id);
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(())
    }

    /// Remove every completed todo in `category` (the "empty trash" action).
    pub async fn remove_all_completed(&mut self, category: &str) -> Result<()> {
        let mut todos = self.cache.clone();
        todos.retain(|t| !(t.category == category && t.completed));
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(())
    }

    /// Rewrite `category` on every todo referencing `old_name`. Must be
    /// persisted before the renamed category array is committed, so no reload
    /// window shows todos under a vanished name.
    pub async fn cascade_rename_category(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let mut todos = self.cache.clone();
        for todo in &mut todos {
            if todo.category == old_name {
                todo.category = new_name.to_owned();
            }
        }
        self.persist(&todos).await?;
        self.commit(todos);
        Ok(())
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Todo> {
        self.cache.iter().filter(move |t| t.category == category)
    }

    pub fn pending_count(&self, category: &str) -> usize {
        self.in_category(category).filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self, category: &str) -> usize {
        self.in_category(category).filter(|t| t.completed).count()
    }

    async fn persist(&self, todos: &[Todo]) -> Result<()> {
        let raw = serde_json::to_string(todos)?;
        self.kv.set(TODOS_KEY, &raw).await
    }

    fn commit(&mut self, todos: Vec<Todo>) {
        self.cache = todos;
        self.listeners.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    fn store() -> (Arc<MemoryKv>, TodoStore) {
        let kv = Arc::new(MemoryKv::new());
        let store = TodoStore::new(kv.clone() as Arc<dyn KeyValueStore>);
        (kv, store)
    }

    #[tokio::test]
    async fn add_sets_defaults() {
        let (_kv, mut store) = store();
        let todo = store.add("Write report", "Work").await.unwrap();
        assert!(!todo.id.is_empty());
        assert!(!todo.completed);
        assert_eq!(todo.comment, "");
        assert_eq!(store.list(), &[todo]);
    }

    #[tokio::test]
    async fn add_rejects_blank_name() {
        let (_kv, mut store) = store();
        assert!(matches!(
            store.add("  ", "Work").await,
            Err(Error::Validation(_))
        ));
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_restores_original() {
        let (_kv, mut store) = store();
        let todo = store.add("Write report", "Work").await.unwrap();

        store.toggle_complete(&todo.id).await.unwrap();
        assert!(store.list()[0].completed);
        store.toggle_complete(&todo.id).await.unwrap();
        assert_eq!(store.list()[0], todo);
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_noop() {
        let (_kv, mut store) = store();
        store.add("a", "X").await.unwrap();
        let before = store.list().to_vec();
        store.toggle_complete("no-such-id").await.unwrap();
        assert_eq!(store.list(), before);
    }

    #[tokio::test]
    async fn edit_replaces_name_and_comment() {
        let (_kv, mut store) = store();
        let todo = store.add("Write report", "Work").await.unwrap();
        store.edit(&todo.id, "Write Q3 report", "due Friday").await.unwrap();
        assert_eq!(store.list()[0].name, "Write Q3 report");
        assert_eq!(store.list()[0].comment, "due Friday");

        assert!(matches!(
            store.edit(&todo.id, " ", "x").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(store.list()[0].name, "Write Q3 report");
    }

    #[tokio::test]
    async fn remove_all_completed_scopes_to_category() {
        let (_kv, mut store) = store();
        let a = store.add("a", "Work").await.unwrap();
        store.add("b", "Work").await.unwrap();
        let c = store.add("c", "Home").await.unwrap();
        store.toggle_complete(&a.id).await.unwrap();
        store.toggle_complete(&c.id).await.unwrap();

        store.remove_all_completed("Work").await.unwrap();

        let names: Vec<_> = store.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!(store.list().iter().find(|t| t.name == "c").unwrap().completed);
    }

    #[tokio::test]
    async fn cascade_rename_rewrites_every_reference() {
        let (_kv, mut store) = store();
        store.add("a", "Work").await.unwrap();
        store.add("b", "Work").await.unwrap();
        store.add("c", "Home").await.unwrap();

        store.cascade_rename_category("Work", "Job").await.unwrap();

        assert_eq!(store.in_category("Work").count(), 0);
        assert_eq!(store.in_category("Job").count(), 2);
        assert_eq!(store.in_category("Home").count(), 1);
    }

    #[tokio::test]
    async fn derived_counts() {
        let (_kv, mut store) = store();
        let a = store.add("a", "Work").await.unwrap();
        store.add("b", "Work").await.unwrap();
        store.toggle_complete(&a.id).await.unwrap();

        assert_eq!(store.pending_count("Work"), 1);
        assert_eq!(store.completed_count("Work"), 1);
        assert_eq!(store.pending_count("Home"), 0);
    }

    #[tokio::test]
    async fn failed_persist_leaves_cache_untouched() {
        let (kv, mut store) = store();
        let todo = store.add("a", "Work").await.unwrap();
        kv.set_fail_writes(true);
        assert!(store.toggle_complete(&todo.id).await.is_err());
        assert!(!store.list()[0].completed);
    }
}
