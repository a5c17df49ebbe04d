// src/fanout.rs

//! Concurrent fan-out with per-item failure isolation.
//!
//! [`run_all`] starts one [`AsyncResult`] per item and waits until **every**
//! item has settled. Failed items are reported through an error handler and
//! left out of the successful results; they never fail the batch, which is
//! why the returned computation has [`Infallible`] as its error type.
//!
//! Successful results keep the order of the input items, regardless of the
//! order in which items settle.

use std::convert::Infallible;

use futures::StreamExt;
use futures::stream;
use tracing::debug;

use crate::future::AsyncResult;

/// Builder-style runner for a fan-out batch.
///
/// The default runner has no concurrency limit: every item's operation is
/// started as soon as the batch runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanOut {
    max_concurrency: Option<usize>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many item operations may be in flight at once.
    ///
    /// A limit of `0` is treated as `1`.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }

    /// Run `op` for every item.
    ///
    /// `on_item_error` is invoked exactly once for each failing item, at the
    /// moment that item settles.
    pub fn run<I, O, E, Op, H>(
        self,
        items: Vec<I>,
        mut op: Op,
        mut on_item_error: H,
    ) -> AsyncResult<Vec<O>, Infallible>
    where
        I: Send + 'static,
        O: Send + 'static,
        E: Send + 'static,
        Op: FnMut(I) -> AsyncResult<O, E> + Send + 'static,
        H: FnMut(E) + Send + 'static,
    {
        let limit = self.max_concurrency.unwrap_or(usize::MAX);

        AsyncResult::defer(move || async move {
            let total = items.len();
            let mut settled = stream::iter(items.into_iter().enumerate())
                .map(|(index, item)| {
                    let pending = op(item);
                    async move { (index, pending.await) }
                })
                .buffer_unordered(limit);

            let mut successes: Vec<(usize, O)> = Vec::with_capacity(total);
            let mut failures = 0usize;

            while let Some((index, result)) = settled.next().await {
                match result {
                    Ok(value) => successes.push((index, value)),
                    Err(error) => {
                        failures += 1;
                        on_item_error(error);
                    }
                }
            }

            debug!(total, failures, "fan-out batch settled");

            successes.sort_by_key(|(index, _)| *index);
            Ok(successes.into_iter().map(|(_, value)| value).collect())
        })
    }
}

/// Run `op` for every item with no concurrency limit.
///
/// Shorthand for `FanOut::new().run(items, op, on_item_error)`.
pub fn run_all<I, O, E, Op, H>(items: Vec<I>, op: Op, on_item_error: H) -> AsyncResult<Vec<O>, Infallible>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    Op: FnMut(I) -> AsyncResult<O, E> + Send + 'static,
    H: FnMut(E) + Send + 'static,
{
    FanOut::new().run(items, op, on_item_error)
}
