use std::sync::Arc;

use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::store::{Listeners, PROFILE_NAME_KEY};

/// Owns the user's display name, persisted as a plain (non-JSON) string under
/// the `profileName` key. Not included in backups.
pub struct ProfileStore {
    kv: Arc<dyn KeyValueStore>,
    name: String,
    listeners: Listeners,
}

impl ProfileStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            name: String::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.subscribe(listener);
    }

    pub async fn load(&mut self) -> Result<()> {
        self.name = self.kv.get(PROFILE_NAME_KEY).await?.unwrap_or_default();
        self.listeners.notify();
        Ok(())
    }

    pub async fn set_name(&mut self, name: &str) -> Result<()> {
        self.kv.set(PROFILE_NAME_KEY, name).await?;
        self.name = name.to_owned();
        self.listeners.notify();
        Ok(())
    }
}
