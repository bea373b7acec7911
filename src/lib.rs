//! vppstate
//!
//! Declarative reconciliation of VPP dataplane resources and read-only fact
//! gathering over the dataplane's HTTP/JSON API gateway.
//!
//! - [`vpp`] - Gateway client, call shapes, version gate and status catalog
//! - [`reconcile`] - Bridge domain and vhost-user reconcilers
//! - [`facts`] - Fact collection and formatting
//! - [`config`] - Persistent configuration

pub mod config;
pub mod facts;
pub mod reconcile;
#[cfg(test)]
mod test_util;
pub mod vpp;
