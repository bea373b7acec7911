//! Resource reconciliation
//!
//! Each pass compares one desired resource against a fresh snapshot of the
//! dataplane and issues at most one mutating call. Passes share no state: the
//! snapshot is fetched again every time.

pub mod bridge_domain;
pub mod vhost_user;

use crate::vpp::{
    classify, errno, Dataplane, ErrorEntry, MalformedVersion, Reply, TransportError,
    UnknownErrorCode, Variant,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use bridge_domain::BridgeDomainSpec;
pub use vhost_user::VhostUserSpec;

/// Default directory vhost-user sockets live in
pub const DEFAULT_SOCKET_DIR: &str = "/var/sockets";

/// Desired presence of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Settings for one pass
#[derive(Debug, Clone)]
pub struct PassOptions {
    /// Report what would change without issuing mutating calls
    pub dry_run: bool,
    pub socket_dir: PathBuf,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
        }
    }
}

/// Result of a successful pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bd_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_if_index: Option<u32>,
}

impl Outcome {
    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_bd_id(mut self, bd_id: Option<u32>) -> Self {
        self.bd_id = bd_id;
        self
    }

    pub fn with_sw_if_index(mut self, sw_if_index: Option<u32>) -> Self {
        self.sw_if_index = sw_if_index;
        self
    }
}

/// Why a pass failed
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{context}: {entry}")]
    Rejected {
        context: String,
        entry: &'static ErrorEntry,
    },

    #[error(transparent)]
    UnknownErrorCode(#[from] UnknownErrorCode),

    #[error(transparent)]
    MalformedVersion(#[from] MalformedVersion),

    #[error("{count} {kind} records match key {key}; keys must be unique")]
    DuplicateKey {
        kind: &'static str,
        key: String,
        count: usize,
    },

    #[error("{0}")]
    AmbiguousTarget(String),

    #[error("Socket directory {} does not exist or cannot be accessed", .0.display())]
    SocketDirMissing(PathBuf),

    #[error("reply to {message} is missing {field}")]
    MalformedReply {
        message: &'static str,
        field: &'static str,
    },
}

impl ReconcileError {
    /// Catalog entry for a rejected call
    pub fn entry(&self) -> Option<&'static ErrorEntry> {
        match self {
            ReconcileError::Rejected { entry, .. } => Some(*entry),
            _ => None,
        }
    }
}

/// Ask the dataplane for its version and pick the call shape
pub(crate) async fn dispatch_variant<D: Dataplane>(dataplane: &D) -> Result<Variant, ReconcileError> {
    let raw = dataplane
        .show_version()
        .await
        .map_err(|e| snapshot_error(e, "Could not read dataplane version"))?;
    let version = classify(&raw)?;
    let variant = version.variant();
    tracing::debug!("Dataplane version {} ({}), using {:?} calls", raw, version, variant);
    Ok(variant)
}

/// Turn a non-zero `retval` into a catalog-backed failure
pub(crate) fn check_reply(
    reply: &Reply,
    context: impl FnOnce() -> String,
) -> Result<(), ReconcileError> {
    if reply.is_ok() {
        return Ok(());
    }
    let entry = errno::lookup(reply.retval)?;
    Err(ReconcileError::Rejected {
        context: context(),
        entry,
    })
}

/// Map a failing read through the catalog as well
pub(crate) fn snapshot_error(error: TransportError, context: &str) -> ReconcileError {
    match error.retval() {
        Some(retval) => match errno::lookup(retval) {
            Ok(entry) => ReconcileError::Rejected {
                context: context.to_string(),
                entry,
            },
            Err(unknown) => unknown.into(),
        },
        None => error.into(),
    }
}

/// Scan the whole snapshot for records matching a key.
///
/// More than one match breaks the key uniqueness invariant and fails the pass.
pub(crate) fn find_unique<'a, T>(
    records: &'a [T],
    kind: &'static str,
    key: impl fmt::Display,
    matches: impl Fn(&T) -> bool,
) -> Result<Option<&'a T>, ReconcileError> {
    let found: Vec<&T> = records.iter().filter(|r| matches(*r)).collect();
    match found.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        many => Err(ReconcileError::DuplicateKey {
            kind,
            key: key.to_string(),
            count: many.len(),
        }),
    }
}
