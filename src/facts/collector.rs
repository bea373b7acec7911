//! Fact Collector
//!
//! Runs a batch of read-only queries against the dataplane and assembles the
//! named fact set. Queries that fail are skipped: some are unsupported on some
//! dataplane builds, so a partial fact set is a normal result.

use super::format::{project, ProjectionError};
use super::normalize::RawValue;
use super::registry::QueryDef;
use crate::vpp::Dataplane;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Default prefix of every fact name
pub const DEFAULT_NAMESPACE: &str = "vpp";

/// Fact name to projected record(s)
pub type FactSet = Map<String, Value>;

/// Collection failed as a whole
#[derive(Debug, Error)]
pub enum FactError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Ordering of the fact set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Sorting {
    /// Keep query order
    #[default]
    None,
    Asc,
    Desc,
}

/// Result document of a collection run; facts are merged flat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactReport {
    pub changed: bool,
    pub message: String,
    #[serde(flatten)]
    pub facts: FactSet,
}

/// Gathers facts through a dataplane
pub struct FactCollector<'a, D> {
    dataplane: &'a D,
    namespace: String,
    sorting: Sorting,
}

impl<'a, D: Dataplane> FactCollector<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self {
            dataplane,
            namespace: DEFAULT_NAMESPACE.to_string(),
            sorting: Sorting::None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = sorting;
        self
    }

    /// Fact name for a query
    pub fn fact_name(&self, query: &QueryDef) -> String {
        format!("{}_{}", self.namespace, query.name)
    }

    /// Run every query once, in order
    pub async fn collect(&self, queries: &[QueryDef]) -> Result<FactSet, FactError> {
        let mut facts = FactSet::new();

        for query in queries {
            let reply = match self.dataplane.dump(query).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!("Skipping fact {}: {}", query.name, e);
                    continue;
                }
            };

            let projected = project(&RawValue::from_json(reply), query)?;
            facts.insert(self.fact_name(query), projected);
        }

        tracing::info!("Collected {} of {} facts", facts.len(), queries.len());
        Ok(sort_facts(facts, self.sorting))
    }

    /// Collect and wrap the facts in a report
    pub async fn report(&self, queries: &[QueryDef]) -> Result<FactReport, FactError> {
        Ok(FactReport {
            changed: false,
            message: String::new(),
            facts: self.collect(queries).await?,
        })
    }
}

/// Stable sort by fact name
pub fn sort_facts(facts: FactSet, sorting: Sorting) -> FactSet {
    let mut entries: Vec<(String, Value)> = facts.into_iter().collect();
    match sorting {
        Sorting::None => {}
        Sorting::Asc => entries.sort_by(|a, b| a.0.cmp(&b.0)),
        Sorting::Desc => entries.sort_by(|a, b| b.0.cmp(&a.0)),
    }
    entries.into_iter().collect()
}
