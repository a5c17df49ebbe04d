// src/gate.rs

//! Per-instance precondition check.

use std::sync::Arc;

use tracing::debug;

use crate::future::AsyncResult;
use crate::repository::MigrationsRepository;

pub const PENDING_MIGRATIONS_MESSAGE: &str = "There are pending migrations, unable to continue";

/// Resolve to `true` when the instance has no pending migrations.
///
/// Pending migrations, and any failure while asking for them, resolve to
/// [`PENDING_MIGRATIONS_MESSAGE`]. Chaining the rest of a pipeline with
/// `flat_map` then skips it entirely for this instance.
pub fn check_ready(migrations: Arc<dyn MigrationsRepository>) -> AsyncResult<bool> {
    AsyncResult::defer(move || async move {
        match migrations.has_pending().await {
            Ok(false) => Ok(true),
            Ok(true) => Err(PENDING_MIGRATIONS_MESSAGE.to_string()),
            Err(err) => {
                debug!(error = %err, "migration check failed");
                Err(PENDING_MIGRATIONS_MESSAGE.to_string())
            }
        }
    })
}
