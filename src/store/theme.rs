use std::sync::Arc;

use crate::core::theme::Theme;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::store::{Listeners, THEME_KEY};

/// Owns the global theme setting, persisted as a literal string under the
/// `theme` key. Theme-derived side effects (status-bar color, backgrounds)
/// belong to the subscribers, not to this store.
pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
    current: Theme,
    listeners: Listeners,
}

impl ThemeStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            current: Theme::Light,
            listeners: Listeners::default(),
        }
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Read the persisted value. Absent or outside the two-element domain
    /// falls back to light.
    pub async fn load(&mut self) -> Result<()> {
        let theme = self
            .kv
            .get(THEME_KEY)
            .await?
            .and_then(|raw| Theme::from_str(&raw))
            .unwrap_or_default();
        self.current = theme;
        self.listeners.notify();
        Ok(())
    }

    pub async fn set(&mut self, theme: Theme) -> Result<()> {
        self.kv.set(THEME_KEY, theme.as_str()).await?;
        self.current = theme;
        self.listeners.notify();
        Ok(())
    }

    pub async fn toggle(&mut self) -> Result<()> {
        self.set(self.current.toggled()).await
    }
}
