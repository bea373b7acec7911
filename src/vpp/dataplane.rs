//! Dataplane capability interface
//!
//! One method per RPC the engine issues. The HTTP gateway client implements it
//! for real dataplanes; unit tests use an in-memory implementation.

use super::version::Variant;
use crate::facts::QueryDef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure below the dataplane API: the call never produced a usable reply
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid dataplane endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("dataplane unavailable: {0}")]
    Unavailable(String),

    #[error("request for {message} failed: {source}")]
    Request {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("gateway returned HTTP {status} for {message}: {hint}")]
    Status {
        message: String,
        status: u16,
        hint: &'static str,
    },

    #[error("could not decode reply to {message}: {source}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message} returned status {retval}")]
    Retval { message: String, retval: i32 },
}

impl TransportError {
    /// Non-zero status reported for a read-only call, if that is what this is
    pub fn retval(&self) -> Option<i32> {
        match self {
            TransportError::Retval { retval, .. } => Some(*retval),
            _ => None,
        }
    }
}

/// Reply to a call: `retval` plus call-specific fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub retval: i32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Reply {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_retval(retval: i32) -> Self {
        Self {
            retval,
            fields: Map::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.retval == 0
    }

    /// Read an unsigned integer field, e.g. `sw_if_index`
    pub fn get_u32(&self, field: &str) -> Option<u32> {
        self.fields
            .get(field)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }
}

/// One entry of `bridge_domain_dump`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeDomainDetails {
    pub bd_id: u32,
    #[serde(default)]
    pub flood: bool,
    #[serde(default)]
    pub uu_flood: bool,
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub learn: bool,
    #[serde(default)]
    pub arp_term: bool,
    #[serde(default)]
    pub arp_ufwd: bool,
    #[serde(default)]
    pub mac_age: u8,
    #[serde(default)]
    pub bd_tag: String,
    #[serde(default)]
    pub n_sw_ifs: u32,
}

/// One entry of `sw_interface_vhost_user_dump`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhostUserDetails {
    pub sw_if_index: u32,
    #[serde(default)]
    pub interface_name: String,
    pub sock_filename: String,
    #[serde(default)]
    pub is_server: bool,
    #[serde(default)]
    pub num_regions: u32,
    #[serde(default)]
    pub sock_errno: i32,
}

/// Arguments of `bridge_domain_add_del[_v2]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeDomainAddDel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bd_id: Option<u32>,
    pub flood: bool,
    pub uu_flood: bool,
    pub forward: bool,
    pub learn: bool,
    pub arp_term: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bd_tag: Option<String>,
    pub is_add: bool,
}

impl BridgeDomainAddDel {
    pub fn delete(bd_id: u32) -> Self {
        Self {
            bd_id: Some(bd_id),
            is_add: false,
            ..Self::default()
        }
    }
}

/// Arguments of `create_vhost_user_if[_v2]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateVhostUserIf {
    pub is_server: bool,
    pub sock_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Arguments of `modify_vhost_user_if[_v2]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifyVhostUserIf {
    pub sw_if_index: u32,
    pub is_server: bool,
    pub sock_filename: String,
}

/// Arguments of `delete_vhost_user_if`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteVhostUserIf {
    pub sw_if_index: u32,
}

/// Calls the engine can make against a dataplane.
///
/// Calls are issued one at a time; implementations need not support
/// overlapping requests.
#[allow(async_fn_in_trait)]
pub trait Dataplane {
    /// Raw version string, e.g. `23.10-release`
    async fn show_version(&self) -> Result<String, TransportError>;

    async fn bridge_domain_dump(&self) -> Result<Vec<BridgeDomainDetails>, TransportError>;

    async fn bridge_domain_add_del(
        &self,
        variant: Variant,
        args: &BridgeDomainAddDel,
    ) -> Result<Reply, TransportError>;

    async fn sw_interface_vhost_user_dump(&self) -> Result<Vec<VhostUserDetails>, TransportError>;

    /// Reply carries the new `sw_if_index`
    async fn create_vhost_user_if(
        &self,
        variant: Variant,
        args: &CreateVhostUserIf,
    ) -> Result<Reply, TransportError>;

    async fn modify_vhost_user_if(
        &self,
        variant: Variant,
        args: &ModifyVhostUserIf,
    ) -> Result<Reply, TransportError>;

    async fn delete_vhost_user_if(&self, args: &DeleteVhostUserIf) -> Result<Reply, TransportError>;

    /// Read-only call for a registered fact query
    async fn dump(&self, query: &QueryDef) -> Result<Value, TransportError>;
}
