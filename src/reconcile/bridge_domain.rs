//! Bridge domain reconciliation
//!
//! Keyed bridge domains are created when missing and left alone when present;
//! changing the settings of an existing domain is not attempted. Without a key
//! every pass creates a new domain with a dataplane-assigned id.

use super::{
    check_reply, dispatch_variant, find_unique, snapshot_error, Outcome, PassOptions,
    ReconcileError, State,
};
use crate::vpp::{BridgeDomainAddDel, BridgeDomainDetails, Dataplane};
use serde::Deserialize;
use tracing::info;

fn enabled() -> bool {
    true
}

/// Desired bridge domain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeDomainSpec {
    #[serde(default)]
    pub state: State,
    /// Bridge domain id; 0 or absent means "no key"
    #[serde(default)]
    pub bd: Option<u32>,
    #[serde(default = "enabled")]
    pub flood: bool,
    #[serde(default = "enabled")]
    pub uu_flood: bool,
    #[serde(default = "enabled")]
    pub learn: bool,
    #[serde(default)]
    pub forward: Option<bool>,
    #[serde(default)]
    pub arp_term: Option<bool>,
    #[serde(default)]
    pub bd_tag: Option<String>,
}

impl Default for BridgeDomainSpec {
    fn default() -> Self {
        Self {
            state: State::Present,
            bd: None,
            flood: true,
            uu_flood: true,
            learn: true,
            forward: None,
            arp_term: None,
            bd_tag: None,
        }
    }
}

impl BridgeDomainSpec {
    /// Natural key. Domain 0 is the dataplane's default domain and never a key.
    pub fn key(&self) -> Option<u32> {
        self.bd.filter(|id| *id != 0)
    }

    /// Arguments for the create call
    pub fn add_args(&self) -> BridgeDomainAddDel {
        BridgeDomainAddDel {
            bd_id: self.key(),
            flood: self.flood,
            uu_flood: self.uu_flood,
            forward: self.forward.unwrap_or(false),
            learn: self.learn,
            arp_term: self.arp_term.unwrap_or(false),
            bd_tag: self.bd_tag.clone().filter(|t| !t.is_empty()),
            is_add: true,
        }
    }
}

/// What a pass is going to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Create { bd_id: Option<u32> },
    /// Keyed domain already present. Update-in-place would branch from here.
    Exists { bd_id: u32 },
    Delete { bd_id: u32 },
    /// Nothing to delete
    Missing { bd_id: Option<u32> },
}

/// Decide the transition from desired state and the current snapshot
pub fn plan(
    spec: &BridgeDomainSpec,
    snapshot: &[BridgeDomainDetails],
) -> Result<Transition, ReconcileError> {
    let Some(bd_id) = spec.key() else {
        return Ok(match spec.state {
            State::Present => Transition::Create { bd_id: None },
            State::Absent => Transition::Missing { bd_id: None },
        });
    };

    let existing = find_unique(snapshot, "bridge domain", bd_id, |bd| bd.bd_id == bd_id)?;

    Ok(match (spec.state, existing) {
        (State::Present, Some(_)) => Transition::Exists { bd_id },
        (State::Present, None) => Transition::Create { bd_id: Some(bd_id) },
        (State::Absent, Some(_)) => Transition::Delete { bd_id },
        (State::Absent, None) => Transition::Missing { bd_id: Some(bd_id) },
    })
}

fn label(bd_id: Option<u32>) -> String {
    match bd_id {
        Some(id) => id.to_string(),
        None => "with dataplane-assigned id".to_string(),
    }
}

/// Run one reconciliation pass for a bridge domain
pub async fn reconcile<D: Dataplane>(
    dataplane: &D,
    spec: &BridgeDomainSpec,
    options: &PassOptions,
) -> Result<Outcome, ReconcileError> {
    let snapshot = if spec.key().is_some() {
        dataplane
            .bridge_domain_dump()
            .await
            .map_err(|e| snapshot_error(e, "Could not list bridge domains"))?
    } else {
        Vec::new()
    };

    let transition = plan(spec, &snapshot)?;
    tracing::debug!("Bridge domain transition: {:?}", transition);

    match transition {
        Transition::Exists { bd_id } => Ok(Outcome::unchanged(format!(
            "Bridge domain {} already exists. Not changing",
            bd_id
        ))
        .with_bd_id(Some(bd_id))),

        Transition::Missing { bd_id: Some(bd_id) } => Ok(Outcome::unchanged(format!(
            "Bridge domain {} does not exist",
            bd_id
        ))),

        Transition::Missing { bd_id: None } => Ok(Outcome::unchanged(
            "No bridge domain given, nothing to remove",
        )),

        Transition::Create { bd_id } => {
            let variant = dispatch_variant(dataplane).await?;
            if options.dry_run {
                return Ok(Outcome::changed(format!(
                    "Bridge domain {} would be created",
                    label(bd_id)
                ))
                .with_bd_id(bd_id));
            }

            let reply = dataplane
                .bridge_domain_add_del(variant, &spec.add_args())
                .await?;
            check_reply(&reply, || {
                format!("Could not perform action on bridge_domain {}", label(bd_id))
            })?;

            let bd_id = bd_id.or_else(|| reply.get_u32("bd_id"));
            info!("Created bridge domain {}", label(bd_id));
            Ok(Outcome::changed(format!(
                "Bridge domain {} configured successfully",
                label(bd_id)
            ))
            .with_bd_id(bd_id))
        }

        Transition::Delete { bd_id } => {
            let variant = dispatch_variant(dataplane).await?;
            if options.dry_run {
                return Ok(Outcome::changed(format!(
                    "Bridge domain {} would be deleted",
                    bd_id
                ))
                .with_bd_id(Some(bd_id)));
            }

            let reply = dataplane
                .bridge_domain_add_del(variant, &BridgeDomainAddDel::delete(bd_id))
                .await?;
            check_reply(&reply, || format!("Could not delete bridge domain {}", bd_id))?;

            info!("Deleted bridge domain {}", bd_id);
            Ok(Outcome::changed(format!(
                "Bridge domain {} has been deleted successfully",
                bd_id
            ))
            .with_bd_id(Some(bd_id)))
        }
    }
}
