//! In-memory dataplane for tests
//!
//! [`FakeDataplane`] keeps bridge domains and vhost-user interfaces in memory,
//! applies mutating calls to them and records every call it receives.

use crate::facts::QueryDef;
use crate::vpp::client::check_dump;
use crate::vpp::{
    BridgeDomainAddDel, BridgeDomainDetails, CreateVhostUserIf, Dataplane, DeleteVhostUserIf,
    ModifyVhostUserIf, Reply, TransportError, Variant, VhostUserDetails,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

const BD_ALREADY_EXISTS: i32 = -119;
const NO_SUCH_ENTRY: i32 = -6;
const INVALID_SW_IF_INDEX: i32 = -2;

/// One call as received by the fake
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Wire message name, including any `_v2` suffix
    pub message: String,
    pub args: Value,
    pub mutating: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    version: String,
    version_retval: Option<i32>,
    bridge_domains: Vec<BridgeDomainDetails>,
    vhost_users: Vec<VhostUserDetails>,
    dumps: HashMap<String, Value>,
    faults: HashSet<String>,
    next_retval: Option<i32>,
    calls: Vec<RecordedCall>,
}

/// Dataplane double backed by plain vectors
#[derive(Debug, Default)]
pub struct FakeDataplane {
    state: Mutex<FakeState>,
}

impl FakeDataplane {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                version: version.into(),
                ..FakeState::default()
            }),
        }
    }

    pub fn with_bridge_domain(self, bd_id: u32, bd_tag: &str) -> Self {
        self.lock().bridge_domains.push(BridgeDomainDetails {
            bd_id,
            flood: true,
            uu_flood: true,
            learn: true,
            bd_tag: bd_tag.to_string(),
            ..BridgeDomainDetails::default()
        });
        self
    }

    pub fn with_vhost_user(self, sw_if_index: u32, sock_filename: &str, is_server: bool) -> Self {
        self.lock().vhost_users.push(vhost_user(sw_if_index, sock_filename, is_server));
        self
    }

    /// Canned reply for a registered query
    pub fn with_dump(self, message: &str, reply: Value) -> Self {
        self.lock().dumps.insert(message.to_string(), reply);
        self
    }

    /// Every call with this message name fails at the transport
    pub fn with_fault(self, message: &str) -> Self {
        self.lock().faults.insert(message.to_string());
        self
    }

    /// The next mutating call is rejected with `retval`
    pub fn failing_with(self, retval: i32) -> Self {
        self.lock().next_retval = Some(retval);
        self
    }

    /// `show_version` answers with a failing `retval`
    pub fn with_version_retval(self, retval: i32) -> Self {
        self.lock().version_retval = Some(retval);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.iter().filter(|c| c.mutating).cloned().collect()
    }

    pub fn bridge_domains(&self) -> Vec<BridgeDomainDetails> {
        self.lock().bridge_domains.clone()
    }

    pub fn vhost_users(&self) -> Vec<VhostUserDetails> {
        self.lock().vhost_users.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call, then apply injected faults and rejections
    fn receive(
        &self,
        message: String,
        args: &impl Serialize,
        mutating: bool,
    ) -> Result<(MutexGuard<'_, FakeState>, Option<Reply>), TransportError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            message: message.clone(),
            args: serde_json::to_value(args).unwrap_or(Value::Null),
            mutating,
        });

        if state.faults.contains(&message) {
            return Err(TransportError::Unavailable(format!("injected fault on {}", message)));
        }

        let rejected = if mutating {
            state.next_retval.take().map(Reply::with_retval)
        } else {
            None
        };
        Ok((state, rejected))
    }
}

fn vhost_user(sw_if_index: u32, sock_filename: &str, is_server: bool) -> VhostUserDetails {
    VhostUserDetails {
        sw_if_index,
        interface_name: format!("VirtualEthernet0/0/{}", sw_if_index),
        sock_filename: sock_filename.to_string(),
        is_server,
        ..VhostUserDetails::default()
    }
}

fn bd_position(state: &FakeState, bd_id: u32) -> Option<usize> {
    state.bridge_domains.iter().position(|bd| bd.bd_id == bd_id)
}

fn reply_with(field: &str, value: u32) -> Reply {
    let mut reply = Reply::ok();
    reply.fields.insert(field.to_string(), json!(value));
    reply
}

impl Dataplane for FakeDataplane {
    async fn show_version(&self) -> Result<String, TransportError> {
        let (state, _) = self.receive("show_version".to_string(), &json!({}), false)?;
        if let Some(retval) = state.version_retval {
            return Err(TransportError::Retval {
                message: "show_version".to_string(),
                retval,
            });
        }
        Ok(state.version.clone())
    }

    async fn bridge_domain_dump(&self) -> Result<Vec<BridgeDomainDetails>, TransportError> {
        let (state, _) = self.receive("bridge_domain_dump".to_string(), &json!({}), false)?;
        Ok(state.bridge_domains.clone())
    }

    async fn bridge_domain_add_del(
        &self,
        variant: Variant,
        args: &BridgeDomainAddDel,
    ) -> Result<Reply, TransportError> {
        let message = variant.message("bridge_domain_add_del");
        let (mut state, rejected) = self.receive(message, args, true)?;
        if let Some(reply) = rejected {
            return Ok(reply);
        }

        if !args.is_add {
            let Some(index) = args.bd_id.and_then(|id| bd_position(&state, id)) else {
                return Ok(Reply::with_retval(NO_SUCH_ENTRY));
            };
            state.bridge_domains.remove(index);
            return Ok(Reply::ok());
        }

        let bd_id = match args.bd_id {
            Some(id) if bd_position(&state, id).is_some() => return Ok(Reply::with_retval(BD_ALREADY_EXISTS)),
            Some(id) => id,
            None => state.bridge_domains.iter().map(|bd| bd.bd_id).max().unwrap_or(0) + 1,
        };
        state.bridge_domains.push(BridgeDomainDetails {
            bd_id,
            flood: args.flood,
            uu_flood: args.uu_flood,
            forward: args.forward,
            learn: args.learn,
            arp_term: args.arp_term,
            bd_tag: args.bd_tag.clone().unwrap_or_default(),
            ..BridgeDomainDetails::default()
        });
        Ok(reply_with("bd_id", bd_id))
    }

    async fn sw_interface_vhost_user_dump(&self) -> Result<Vec<VhostUserDetails>, TransportError> {
        let (state, _) = self.receive("sw_interface_vhost_user_dump".to_string(), &json!({}), false)?;
        Ok(state.vhost_users.clone())
    }

    async fn create_vhost_user_if(
        &self,
        variant: Variant,
        args: &CreateVhostUserIf,
    ) -> Result<Reply, TransportError> {
        let (mut state, rejected) = self.receive(variant.message("create_vhost_user_if"), args, true)?;
        if let Some(reply) = rejected {
            return Ok(reply);
        }

        let sw_if_index = state.vhost_users.iter().map(|i| i.sw_if_index).max().unwrap_or(0) + 1;
        state
            .vhost_users
            .push(vhost_user(sw_if_index, &args.sock_filename, args.is_server));
        Ok(reply_with("sw_if_index", sw_if_index))
    }

    async fn modify_vhost_user_if(
        &self,
        variant: Variant,
        args: &ModifyVhostUserIf,
    ) -> Result<Reply, TransportError> {
        let (mut state, rejected) = self.receive(variant.message("modify_vhost_user_if"), args, true)?;
        if let Some(reply) = rejected {
            return Ok(reply);
        }

        match state.vhost_users.iter_mut().find(|i| i.sw_if_index == args.sw_if_index) {
            Some(interface) => {
                interface.is_server = args.is_server;
                interface.sock_filename = args.sock_filename.clone();
                Ok(Reply::ok())
            }
            None => Ok(Reply::with_retval(INVALID_SW_IF_INDEX)),
        }
    }

    async fn delete_vhost_user_if(&self, args: &DeleteVhostUserIf) -> Result<Reply, TransportError> {
        let (mut state, rejected) = self.receive("delete_vhost_user_if".to_string(), args, true)?;
        if let Some(reply) = rejected {
            return Ok(reply);
        }

        let before = state.vhost_users.len();
        state.vhost_users.retain(|i| i.sw_if_index != args.sw_if_index);
        if state.vhost_users.len() == before {
            return Ok(Reply::with_retval(INVALID_SW_IF_INDEX));
        }
        Ok(Reply::ok())
    }

    async fn dump(&self, query: &QueryDef) -> Result<Value, TransportError> {
        let (state, _) = self.receive(query.name.to_string(), &json!({}), false)?;

        let reply = match state.dumps.get(query.name) {
            Some(reply) => reply.clone(),
            None => match query.name {
                "bridge_domain_dump" => serde_json::to_value(&state.bridge_domains),
                "sw_interface_vhost_user_dump" => serde_json::to_value(&state.vhost_users),
                _ => Ok(Value::Array(Vec::new())),
            }
            .map_err(|source| TransportError::Decode {
                message: query.name.to_string(),
                source,
            })?,
        };

        check_dump(query.name, reply)
    }
}
