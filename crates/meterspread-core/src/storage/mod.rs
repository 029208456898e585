mod config;
pub mod database;

pub use config::{Config, DefaultsConfig, MemoryConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Returns `~/.config/meterspread[-dev]/` based on METERSPREAD_ENV.
///
/// Set METERSPREAD_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("METERSPREAD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("meterspread-dev")
    } else {
        base_dir.join("meterspread")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// String key-value store contract used by the adaptive weight memory.
pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn kv_delete(&self, key: &str) -> Result<(), DatabaseError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).kv_set(key, value)
    }

    fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        (**self).kv_delete(key)
    }
}
