// src/metadata/mod.rs

//! Metadata lookup and merge engine.
//!
//! - [`model`] holds the entity summaries and package types.
//! - [`merge`] combines several raw packages into one de-duplicated package.
//! - [`cache`] is the get-or-compute cache backing [`MetadataRepository::search`].
//! - [`repository`] defines the remote [`MetadataApi`] seam and the
//!   [`MetadataRepository`] built on top of it.

pub mod cache;
pub mod merge;
pub mod model;
pub mod repository;

pub use cache::SharedCache;
pub use merge::{merge_packages, SYSTEM_KIND};
pub use model::{Metadata, MetadataKind, MetadataPackage, RawMetadataPackage};
pub use repository::{
    IdentifiableFilter, ListOptions, MetadataApi, MetadataRepository, PackageFilter,
};
