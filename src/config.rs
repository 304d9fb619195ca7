use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("never-idle")
}

fn default_scratch_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("never-idle")
}

/// Where the app keeps its persisted store and its transient backup files.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Scratch location for single-use backup exports, cleaned up after the
    /// share sheet closes.
    pub scratch_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

impl AppConfig {
    /// The single file holding every persisted key.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    /// Ensure both directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.scratch_dir)?;
        Ok(())
    }
}
