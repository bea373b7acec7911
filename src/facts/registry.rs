//! Query Registry - Load fact query definitions from JSON
//!
//! This module loads the known read-only queries, their grouping and the fixed
//! field projections from embedded JSON files, and provides lookup functions
//! for the rest of the crate.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded query JSON files (compiled into the binary)
const QUERY_FILES: &[&str] = &[
    include_str!("../resources/groups.json"),
    include_str!("../resources/projections.json"),
];

/// Named group of queries from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDef {
    pub name: String,
    pub queries: Vec<String>,
    /// Whether the group is part of the `all` selection
    #[serde(default = "default_in_all")]
    pub in_all: bool,
}

fn default_in_all() -> bool {
    true
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub default_group: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    /// Fixed field list per query name
    #[serde(default)]
    pub projections: HashMap<String, Vec<String>>,
}

/// A registered read-only query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDef {
    /// Wire message name, e.g. `bridge_domain_dump`
    pub name: &'static str,
    /// Fixed projection, if one is registered
    pub fields: Option<&'static [String]>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<QueryConfig> = OnceLock::new();

/// Get the query registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static QueryConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = QueryConfig::default();

        for content in QUERY_FILES {
            let partial: QueryConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded query JSON: {}", e));
            if partial.default_group.is_some() {
                final_config.default_group = partial.default_group;
            }
            final_config.groups.extend(partial.groups);
            final_config.projections.extend(partial.projections);
        }

        final_config
    })
}

/// Get a query definition by name
pub fn get_query(name: &str) -> Option<QueryDef> {
    let registry = get_registry();
    let name = registry
        .groups
        .iter()
        .flat_map(|g| g.queries.iter())
        .find(|q| q.as_str() == name)?;

    Some(QueryDef {
        name: name.as_str(),
        fields: registry.projections.get(name).map(|f| f.as_slice()),
    })
}

/// Get a group by name
pub fn get_group(name: &str) -> Option<&'static GroupDef> {
    get_registry().groups.iter().find(|g| g.name == name)
}

/// Queries gathered when no filter is given
pub fn default_queries() -> Vec<QueryDef> {
    get_registry()
        .default_group
        .as_deref()
        .and_then(get_group)
        .map(|g| resolve(g.queries.iter().map(|q| q.as_str())))
        .unwrap_or_default()
}

/// Every known query, in group order, without duplicates
pub fn all_queries() -> Vec<QueryDef> {
    resolve(
        get_registry()
            .groups
            .iter()
            .filter(|g| g.in_all)
            .flat_map(|g| g.queries.iter().map(|q| q.as_str())),
    )
}

/// Pick the queries for one collection run.
///
/// `all` wins over the filter; an empty filter selects the default group.
/// Filter entries may name a query or a group. Unknown names are dropped.
pub fn select_queries(all: bool, filter: &[String]) -> Vec<QueryDef> {
    if all {
        return all_queries();
    }
    if filter.iter().all(|f| f.trim().is_empty()) {
        return default_queries();
    }

    let mut names: Vec<&str> = Vec::new();
    for entry in filter.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if get_query(entry).is_some() {
            names.push(entry);
        } else if let Some(group) = get_group(entry) {
            names.extend(group.queries.iter().map(|q| q.as_str()));
        } else {
            tracing::warn!("Ignoring unknown fact query: {}", entry);
        }
    }

    resolve(names.into_iter())
}

fn resolve<'a>(names: impl Iterator<Item = &'a str>) -> Vec<QueryDef> {
    let mut seen = std::collections::HashSet::new();
    names
        .filter(|name| seen.insert(name.to_string()))
        .filter_map(get_query)
        .collect()
}
