//! Fact gathering
//!
//! Read-only queries are described by data: which queries exist, how they are
//! grouped, and which of them have a fixed field projection all come from JSON
//! files embedded at compile time.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches query definitions from embedded JSON
//! - [`normalize`] - Generic recursive normalizer for unknown reply shapes
//! - [`format`] - Fixed projections with normalizer fallback
//! - [`collector`] - Runs a batch of queries into a [`FactSet`]
//!
//! # Query Definitions
//!
//! Queries are defined in JSON files under `src/resources/`:
//! - `groups.json` - Named query groups (`common`, `l2`, `interface`, ...)
//! - `projections.json` - Fixed field lists for well-known queries
//!
//! # Example
//!
//! ```ignore
//! use vppstate::facts::{select_queries, FactCollector, Sorting};
//!
//! async fn gather(client: &VppClient) -> anyhow::Result<FactSet> {
//!     let queries = select_queries(false, &["l2".to_string()]);
//!     let facts = FactCollector::new(client)
//!         .with_sorting(Sorting::Asc)
//!         .collect(&queries)
//!         .await?;
//!     Ok(facts)
//! }
//! ```

pub mod collector;
pub mod format;
pub mod normalize;
mod registry;

pub use collector::{FactCollector, FactError, FactReport, FactSet, Sorting, DEFAULT_NAMESPACE};
pub use format::{project, ProjectionError};
pub use normalize::{normalize, RawObject, RawValue, DEFAULT_DEPTH_BUDGET};
pub use registry::*;
