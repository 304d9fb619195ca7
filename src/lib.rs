//! Data layer of the Never Idle to-do app: category, todo, theme and profile
//! stores over an async key-value backend, plus the backup/restore protocol.
//!
//! Presentation is the host's concern. The platform share sheet and document
//! picker are injected through the [`backup::ShareSink`] and
//! [`backup::DocumentPicker`] traits; the persistent backend through
//! [`kv::KeyValueStore`].

pub mod app;
pub mod backup;
pub mod config;
pub mod core;
pub mod error;
pub mod kv;
pub mod store;

pub use app::App;
pub use config::AppConfig;
pub use error::{Error, Result};
