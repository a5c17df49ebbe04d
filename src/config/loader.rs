// src/config/loader.rs

use std::path::Path;

use crate::config::model::{RawSchedulerConfig, SchedulerConfig};
use crate::errors::{Result, SchedulerError};
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file from a given path and return the raw config.
///
/// This only performs JSON deserialization; it does **not** validate
/// addresses or credentials. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawSchedulerConfig> {
    let path = path.as_ref();

    if !fs.is_file(path) {
        return Err(SchedulerError::ConfigError(format!(
            "config file {} does not exist",
            path.display()
        )));
    }

    let contents = fs.read_to_string(path)?;
    let config: RawSchedulerConfig = serde_json::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from disk and validate it.
///
/// This is the entry point used by the binary.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    load_and_validate_with_fs(&RealFileSystem, path)
}

/// Same as [`load_and_validate`], reading through the given filesystem.
pub fn load_and_validate_with_fs(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    let raw_config = load_from_path(fs, path)?;
    let config = SchedulerConfig::try_from(raw_config)?;
    Ok(config)
}
