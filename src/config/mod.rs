// src/config/mod.rs

//! Configuration loading and validation for the scheduler.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Load a config file through a [`crate::fs::FileSystem`] (`loader.rs`).
//! - Validate instance addresses and credentials (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_and_validate_with_fs, load_from_path};
pub use model::{Credentials, InstanceConfig, RawInstanceConfig, RawSchedulerConfig, SchedulerConfig};
