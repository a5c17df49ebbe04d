// src/future/mod.rs

//! Lazy, composable asynchronous results.
//!
//! [`AsyncResult`] wraps a boxed future that resolves to `Result<T, E>`. The
//! wrapped future is never polled until the value is run, either by awaiting
//! it (it implements [`IntoFuture`]) or through [`AsyncResult::run`] with a
//! success/error callback pair. Running consumes the value, so a computation
//! graph built once fires its side effects at most once.
//!
//! Combinators mirror the usual result algebra:
//! - [`AsyncResult::map`] / [`AsyncResult::flat_map`] on the success channel
//! - [`AsyncResult::map_err`] on the error channel
//! - [`AsyncResult::join`] and [`AsyncResult::join_named`] for concurrent
//!   joins
//!
//! Joins resolve to the **first observed** error: as soon as one branch
//! settles with an error, the join settles with it and the remaining branches
//! are dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::future::{Future, IntoFuture};

use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use tracing::{Instrument, Span};

/// Default error payload: a human-readable message.
pub type Message = String;

/// A deferred asynchronous computation yielding `T` or an error `E`.
#[must_use = "an AsyncResult does nothing until it is run or awaited"]
pub struct AsyncResult<T, E = Message> {
    inner: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> AsyncResult<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap an arbitrary future that already yields a `Result`.
    ///
    /// The future is only polled once the `AsyncResult` is run.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self { inner: fut.boxed() }
    }

    /// Build the computation lazily: `f` itself is only invoked at run time.
    pub fn defer<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(async move { f().await })
    }

    pub fn success(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    pub fn error(error: E) -> Self {
        Self::new(future::ready(Err(error)))
    }

    /// Interop with an externally-triggered fallible operation.
    ///
    /// Whatever error type the operation produces is converted into the
    /// error channel instead of being raised.
    pub fn from_future<F, X>(fut: F) -> Self
    where
        F: Future<Output = Result<T, X>> + Send + 'static,
        X: Into<E> + 'static,
    {
        Self::new(fut.map_err(Into::<E>::into))
    }

    /// Transform a future success value. Failures pass through.
    pub fn map<U, F>(self, f: F) -> AsyncResult<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        AsyncResult::new(self.inner.map_ok(f))
    }

    /// Sequence a dependent step. A failure short-circuits without calling `f`.
    pub fn flat_map<U, F>(self, f: F) -> AsyncResult<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> AsyncResult<U, E> + Send + 'static,
    {
        AsyncResult::new(self.inner.and_then(move |value| f(value).inner))
    }

    /// Transform the error channel only.
    pub fn map_err<E2, F>(self, f: F) -> AsyncResult<T, E2>
    where
        E2: Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        AsyncResult::new(self.inner.map_err(f))
    }

    /// Run two computations concurrently and pair their results.
    pub fn join<U>(self, other: AsyncResult<U, E>) -> AsyncResult<(T, U), E>
    where
        U: Send + 'static,
    {
        AsyncResult::new(future::try_join(self.inner, other.inner))
    }

    /// Run a set of named computations concurrently.
    ///
    /// Resolves to all results keyed by name, or to the first observed error.
    pub fn join_named<K>(named: BTreeMap<K, AsyncResult<T, E>>) -> AsyncResult<BTreeMap<K, T>, E>
    where
        K: Ord + Send + 'static,
    {
        let (keys, results): (Vec<K>, Vec<_>) =
            named.into_iter().map(|(k, r)| (k, r.inner)).unzip();

        AsyncResult::new(async move {
            let values = future::try_join_all(results).await?;
            Ok(keys.into_iter().zip(values).collect())
        })
    }

    /// Run the computation inside `span`.
    pub fn in_span(self, span: Span) -> Self {
        Self::new(self.inner.instrument(span))
    }

    /// Run the computation, delivering the outcome to one of two callbacks.
    pub async fn run<S, F>(self, on_success: S, on_error: F)
    where
        S: FnOnce(T),
        F: FnOnce(E),
    {
        match self.inner.await {
            Ok(value) => on_success(value),
            Err(error) => on_error(error),
        }
    }
}

impl<T> AsyncResult<T, Message>
where
    T: Send + 'static,
{
    /// Like [`AsyncResult::from_future`], rendering any displayable error
    /// into a message.
    pub fn attempt<F, X>(fut: F) -> Self
    where
        F: Future<Output = Result<T, X>> + Send + 'static,
        X: fmt::Display,
    {
        Self::new(fut.map_err(|error| error.to_string()))
    }
}

impl<T, E> IntoFuture for AsyncResult<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

impl<T, E> fmt::Debug for AsyncResult<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResult").finish_non_exhaustive()
    }
}
