//! Vhost-user interface reconciliation

use super::{
    check_reply, dispatch_variant, find_unique, snapshot_error, Outcome, PassOptions,
    ReconcileError, State,
};
use crate::vpp::{
    CreateVhostUserIf, Dataplane, DeleteVhostUserIf, ModifyVhostUserIf, VhostUserDetails,
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const KIND: &str = "vhost-user interface";

/// Desired vhost-user interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VhostUserSpec {
    #[serde(default)]
    pub state: State,
    /// Interface index; takes precedence over the socket path when set
    #[serde(default)]
    pub if_idx: Option<u32>,
    #[serde(default)]
    pub is_server: bool,
    /// Socket file name relative to the socket directory
    pub sock_filename: String,
    #[serde(default)]
    pub tag: Option<String>,
}

impl VhostUserSpec {
    pub fn new(sock_filename: impl Into<String>) -> Self {
        Self {
            sock_filename: sock_filename.into(),
            ..Self::default()
        }
    }

    fn index(&self) -> Option<u32> {
        self.if_idx.filter(|idx| *idx != 0)
    }
}

/// What a pass is going to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Create,
    Modify { sw_if_index: u32 },
    Unchanged { sw_if_index: u32 },
    Delete { sw_if_index: u32 },
    /// Nothing to delete
    Missing,
}

/// Full socket path under the socket directory.
///
/// Fails when the directory is not there.
pub fn socket_path(socket_dir: &Path, sock_filename: &str) -> Result<String, ReconcileError> {
    if !socket_dir.is_dir() {
        return Err(ReconcileError::SocketDirMissing(socket_dir.to_path_buf()));
    }
    Ok(socket_dir.join(sock_filename).to_string_lossy().into_owned())
}

/// Decide the transition from desired state and the current snapshot
pub fn plan(
    spec: &VhostUserSpec,
    path: &str,
    snapshot: &[VhostUserDetails],
) -> Result<Transition, ReconcileError> {
    let by_index = |idx: u32| find_unique(snapshot, KIND, idx, |i| i.sw_if_index == idx);
    let by_path = || find_unique(snapshot, KIND, path, |i| i.sock_filename == path);

    match spec.state {
        State::Present => {
            let existing = match spec.index() {
                Some(idx) => by_index(idx)?,
                None => by_path()?,
            };
            Ok(match existing {
                None => Transition::Create,
                Some(current) if current.is_server != spec.is_server || current.sock_filename != path => {
                    Transition::Modify {
                        sw_if_index: current.sw_if_index,
                    }
                }
                Some(current) => Transition::Unchanged {
                    sw_if_index: current.sw_if_index,
                },
            })
        }
        State::Absent => {
            let indexed = match spec.index() {
                Some(idx) => by_index(idx)?,
                None => None,
            };
            let named = by_path()?;

            match (indexed, named) {
                (Some(a), Some(b)) if a.sw_if_index != b.sw_if_index => {
                    Err(ReconcileError::AmbiguousTarget(format!(
                        "Interface index {} and socket {} refer to different vhost-user interfaces ({} and {})",
                        a.sw_if_index, path, a.sw_if_index, b.sw_if_index
                    )))
                }
                (Some(found), _) | (None, Some(found)) => Ok(Transition::Delete {
                    sw_if_index: found.sw_if_index,
                }),
                (None, None) => Ok(Transition::Missing),
            }
        }
    }
}

/// Run one reconciliation pass for a vhost-user interface
pub async fn reconcile<D: Dataplane>(
    dataplane: &D,
    spec: &VhostUserSpec,
    options: &PassOptions,
) -> Result<Outcome, ReconcileError> {
    let path = socket_path(&options.socket_dir, &spec.sock_filename)?;

    let snapshot = dataplane
        .sw_interface_vhost_user_dump()
        .await
        .map_err(|e| snapshot_error(e, "Could not list vhost-user interfaces"))?;

    let transition = plan(spec, &path, &snapshot)?;
    tracing::debug!("Vhost-user transition for {}: {:?}", path, transition);

    let name = &spec.sock_filename;
    match transition {
        Transition::Unchanged { sw_if_index } => Ok(Outcome::unchanged(format!(
            "Vhost-user interface at {} is up to date, interface index is {}",
            name, sw_if_index
        ))
        .with_sw_if_index(Some(sw_if_index))),

        Transition::Missing => Ok(Outcome::unchanged(format!(
            "Vhost-user interface at {} does not exist",
            name
        ))),

        Transition::Create => {
            let variant = dispatch_variant(dataplane).await?;
            if options.dry_run {
                return Ok(Outcome::changed(format!(
                    "Vhost-user interface at {} would be created",
                    name
                )));
            }

            let args = CreateVhostUserIf {
                is_server: spec.is_server,
                sock_filename: path.clone(),
                tag: spec.tag.clone(),
            };
            let reply = dataplane.create_vhost_user_if(variant, &args).await?;
            check_reply(&reply, || format!("Could not create vhost-user interface {}", name))?;

            let sw_if_index =
                reply
                    .get_u32("sw_if_index")
                    .ok_or(ReconcileError::MalformedReply {
                        message: "create_vhost_user_if",
                        field: "sw_if_index",
                    })?;
            info!("Created vhost-user interface {} at {}", sw_if_index, path);
            Ok(Outcome::changed(format!(
                "Created vhost-user interface at {}, interface index is {}",
                name, sw_if_index
            ))
            .with_sw_if_index(Some(sw_if_index)))
        }

        Transition::Modify { sw_if_index } => {
            let variant = dispatch_variant(dataplane).await?;
            if options.dry_run {
                return Ok(Outcome::changed(format!(
                    "Vhost-user interface at {} would be modified",
                    name
                ))
                .with_sw_if_index(Some(sw_if_index)));
            }

            let args = ModifyVhostUserIf {
                sw_if_index,
                is_server: spec.is_server,
                sock_filename: path.clone(),
            };
            let reply = dataplane.modify_vhost_user_if(variant, &args).await?;
            check_reply(&reply, || format!("Could not modify vhost-user interface {}", name))?;

            info!("Modified vhost-user interface {} at {}", sw_if_index, path);
            Ok(Outcome::changed(format!(
                "Modified vhost-user interface at {}",
                name
            ))
            .with_sw_if_index(Some(sw_if_index)))
        }

        Transition::Delete { sw_if_index } => {
            if options.dry_run {
                return Ok(Outcome::changed(format!(
                    "Vhost-user interface {} would be deleted",
                    sw_if_index
                ))
                .with_sw_if_index(Some(sw_if_index)));
            }

            let reply = dataplane
                .delete_vhost_user_if(&DeleteVhostUserIf { sw_if_index })
                .await?;
            check_reply(&reply, || {
                format!("Could not delete vhost-user interface at {} ({})", path, sw_if_index)
            })?;

            info!("Deleted vhost-user interface {}", sw_if_index);
            Ok(Outcome::changed(format!(
                "Deleted vhost-user interface {}",
                sw_if_index
            ))
            .with_sw_if_index(Some(sw_if_index)))
        }
    }
}
