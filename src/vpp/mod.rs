//! Dataplane interaction module
//!
//! # Module Structure
//!
//! - [`dataplane`] - The [`Dataplane`] capability trait and wire message types
//! - [`client`] - Gateway client implementing [`Dataplane`] over HTTP/JSON
//! - [`http`] - HTTP utilities for gateway calls
//! - [`version`] - Version gate selecting legacy or `_v2` call shapes
//! - [`errno`] - Catalog of dataplane status codes
//!
//! # Example
//!
//! ```ignore
//! use vppstate::vpp::{Dataplane, VppClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = VppClient::new("http://127.0.0.1:8080", None, Duration::from_secs(30))?;
//!     let domains = client.bridge_domain_dump().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dataplane;
pub mod errno;
pub mod http;
pub mod version;

pub use client::VppClient;
pub use dataplane::{
    BridgeDomainAddDel, BridgeDomainDetails, CreateVhostUserIf, Dataplane, DeleteVhostUserIf,
    ModifyVhostUserIf, Reply, TransportError, VhostUserDetails,
};
pub use errno::{ErrorEntry, UnknownErrorCode};
pub use version::{classify, MalformedVersion, Variant, VersionTuple};
