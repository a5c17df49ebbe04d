// src/metadata/repository.rs

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::FutureExt;
use tracing::{Instrument, debug, debug_span};

use crate::domain::Page;
use crate::errors::Result;
use crate::future::{AsyncResult, Message};
use crate::metadata::cache::SharedCache;
use crate::metadata::merge::merge_packages;
use crate::metadata::model::{Metadata, MetadataKind, MetadataPackage, RawMetadataPackage};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Filter on the `identifiable` pseudo-property (id, code or name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifiableFilter {
    /// Exact match on any identifier.
    Exact(String),
    /// Every token of the query is contained in some identifier.
    Token(String),
}

/// Filter applied to a cross-kind metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageFilter {
    CodeIn(Vec<String>),
    NameIn(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filter: Option<String>,
}

/// Remote metadata endpoints.
///
/// Every query requests at least `id`, `name` and `code`.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// One page of `kind`. `page` and `page_size` are always set.
    async fn list(&self, kind: &str, options: &ListOptions) -> Result<Page<Metadata>>;

    /// All entities of several kinds in one request.
    async fn list_all(&self, kinds: &[MetadataKind], filter: Option<&str>) -> Result<RawMetadataPackage>;

    /// Unpaginated query over one kind.
    async fn find(&self, kind: &str, filter: &IdentifiableFilter) -> Result<Vec<Metadata>>;

    /// Unpaginated query across all kinds.
    async fn find_package(&self, filter: &PackageFilter) -> Result<RawMetadataPackage>;
}

/// Search, lookup and listing of metadata on one instance.
///
/// Owns the search cache: two repositories never share cached results.
#[derive(Clone)]
pub struct MetadataRepository {
    api: Arc<dyn MetadataApi>,
    search_cache: SharedCache<(MetadataKind, String), Option<Metadata>>,
}

impl fmt::Debug for MetadataRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRepository")
            .field("cached_searches", &self.search_cache.len())
            .finish_non_exhaustive()
    }
}

impl MetadataRepository {
    pub fn new(api: Arc<dyn MetadataApi>) -> Self {
        Self {
            api,
            search_cache: SharedCache::new(),
        }
    }

    /// Page through one kind, defaulting to page 1 of 25 items.
    pub fn list(&self, kind: &str, options: ListOptions) -> AsyncResult<Page<Metadata>> {
        let api = Arc::clone(&self.api);
        let kind = kind.to_string();
        let options = ListOptions {
            page: Some(options.page.unwrap_or(DEFAULT_PAGE)),
            page_size: Some(options.page_size.unwrap_or(DEFAULT_PAGE_SIZE)),
            filter: options.filter,
        };

        AsyncResult::attempt(async move { api.list(&kind, &options).await })
    }

    /// Fetch every entity of the given kinds.
    pub fn list_all(&self, kinds: Vec<MetadataKind>, filter: Option<String>) -> AsyncResult<MetadataPackage> {
        let api = Arc::clone(&self.api);

        AsyncResult::attempt(async move { api.list_all(&kinds, filter.as_deref()).await })
            .map(|raw| merge_packages(&[raw]))
    }

    /// Resolve `query` to one entity of `kind`.
    ///
    /// A single exact match is returned straight away. Zero or several exact
    /// matches fall back to a token query, whose first result (if any) is
    /// returned. Results are cached per `(kind, query)` for the lifetime of
    /// this repository.
    pub fn search(&self, kind: &str, query: &str) -> AsyncResult<Option<Metadata>> {
        let api = Arc::clone(&self.api);
        let cache = self.search_cache.clone();
        let key = (kind.to_string(), query.to_string());

        AsyncResult::defer(move || async move {
            let (kind, query) = key.clone();
            cache
                .get_or_compute(key, move || search_uncached(api, kind, query).boxed())
                .await
        })
    }

    /// Find entities whose code or name is any of `queries`.
    ///
    /// Both queries run concurrently; code matches take precedence when the
    /// same entity is returned by both.
    pub fn lookup(&self, queries: Vec<String>) -> AsyncResult<MetadataPackage> {
        if queries.is_empty() {
            return AsyncResult::success(MetadataPackage::new());
        }

        let by_code = {
            let api = Arc::clone(&self.api);
            let filter = PackageFilter::CodeIn(queries.clone());
            AsyncResult::attempt(async move { api.find_package(&filter).await })
        };
        let by_name = {
            let api = Arc::clone(&self.api);
            let filter = PackageFilter::NameIn(queries);
            AsyncResult::attempt(async move { api.find_package(&filter).await })
        };

        by_code
            .join(by_name)
            .map(|(by_code, by_name)| merge_packages(&[by_code, by_name]))
    }
}

async fn search_uncached(
    api: Arc<dyn MetadataApi>,
    kind: MetadataKind,
    query: String,
) -> std::result::Result<Option<Metadata>, Message> {
    let span = debug_span!("metadata_search", kind = %kind, query = %query);

    async move {
        let exact = api
            .find(&kind, &IdentifiableFilter::Exact(query.clone()))
            .await
            .map_err(|e| e.to_string())?;

        if exact.len() == 1 {
            debug!("single exact match");
            return Ok(exact.into_iter().next());
        }

        debug!(exact_matches = exact.len(), "falling back to token search");
        let similar = api
            .find(&kind, &IdentifiableFilter::Token(query))
            .await
            .map_err(|e| e.to_string())?;

        Ok(similar.into_iter().next())
    }
    .instrument(span)
    .await
}
