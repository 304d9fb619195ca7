use std::sync::Arc;

use crate::core::category::{Category, is_known_icon};
use crate::core::todo::Todo;
use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::store::{CATEGORIES_KEY, Listeners};

/// Shared by `add`, `rename` and the rename orchestration in `App`, which
/// must validate before it starts the todo cascade.
pub(crate) fn validate_entry(name: &str, icon: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("category name is required".into()));
    }
    if icon.is_empty() || !is_known_icon(icon) {
        return Err(Error::Validation(format!("unknown icon \"{icon}\"")));
    }
    Ok(())
}

/// Owns the user-defined category list, persisted as one JSON-encoded array
/// under the `categories` key.
///
/// Every mutation persists the whole array first and only then updates the
/// in-memory cache, so a rejected write leaves `list()` at its pre-mutation
/// value.
pub struct CategoryStore {
    kv: Arc<dyn KeyValueStore>,
    cache: Vec<Category>,
    listeners: Listeners,
}

impl CategoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            cache: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn list(&self) -> &[Category] {
        &self.cache
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Refresh the cache from the persisted array. An absent key and an
    /// unparseable value both load as empty.
    pub async fn load(&mut self) -> Result<()> {
        let cats = match self.kv.get(CATEGORIES_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("discarding unparseable category array: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.commit(cats);
        Ok(())
    }

    /// Append a category. Rejects an empty/whitespace name and an unset or
    /// unknown icon.
    pub async fn add(&mut self, name: &str, icon: &str) -> Result<()> {
        validate_entry(name, icon)?;
        let mut cats = self.cache.clone();
        cats.push(Category::new(name.trim(), icon));
        self.persist(&cats).await?;
        self.commit(cats);
        Ok(())
    }

    /// Replace the category at `index` in place.
    ///
    /// The caller must run the todo store's cascading rename for the old name
    /// before or alongside this call, so no todo is left pointing at a name
    /// that no longer exists (see `App::rename_category`).
    pub async fn rename(&mut self, index: usize, new_name: &str, new_icon: &str) -> Result<()> {
        validate_entry(new_name, new_icon)?;
        if index >= self.cache.len() {
            return Err(Error::Validation(format!("no category at index {index}")));
        }
        let mut cats = self.cache.clone();
        cats[index] = Category::new(new_name.trim(), new_icon);
        self.persist(&cats).await?;
        self.commit(cats);
        Ok(())
    }

    /// Delete the category at `index`. Refused while any todo still
    /// references its name; on refusal nothing changes.
    pub async fn remove(&mut self, index: usize, todos: &[Todo]) -> Result<()> {
        let Some(target) = self.cache.get(index) else {
            return Err(Error::Validation(format!("no category at index {index}")));
        };
        if todos.iter().any(|t| t.category == target.name) {
            return Err(Error::CategoryNotEmpty(target.name.clone()));
        }
        let mut cats = self.cache.clone();
        cats.remove(index);
        self.persist(&cats).await?;
        self.commit(cats);
        Ok(())
    }

    async fn persist(&self, cats: &[Category]) -> Result<()> {
        let raw = serde_json::to_string(cats)?;
        self.kv.set(CATEGORIES_KEY, &raw).await
    }

    fn commit(&mut self, cats: Vec<Category>) {
        self.cache = cats;
        self.listeners.notify();
    }
}
