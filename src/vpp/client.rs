//! Dataplane client
//!
//! Talks to a JSON API gateway in front of the dataplane's binary API. Every
//! call is `POST {endpoint}/api/{message}` with the call arguments as a JSON
//! object; replies are JSON objects carrying `retval`, dumps are JSON arrays.

use super::dataplane::{
    BridgeDomainAddDel, BridgeDomainDetails, CreateVhostUserIf, Dataplane, DeleteVhostUserIf,
    ModifyVhostUserIf, Reply, TransportError, VhostUserDetails,
};
use super::http::VppHttpClient;
use super::version::Variant;
use crate::facts::QueryDef;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Main dataplane client
#[derive(Clone)]
pub struct VppClient {
    pub http: VppHttpClient,
    pub endpoint: Url,
    token: Option<String>,
}

impl VppClient {
    /// Create a new client for a gateway endpoint
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self, TransportError> {
        let mut endpoint = Url::parse(endpoint)?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let http = VppHttpClient::new(timeout)?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Build the URL for a call
    pub fn api_url(&self, message: &str) -> Result<String, TransportError> {
        Ok(self.endpoint.join(&format!("api/{}", message))?.to_string())
    }

    /// Issue a call and return the raw JSON reply
    pub async fn call(&self, message: &str, args: &Value) -> Result<Value, TransportError> {
        let url = self.api_url(message)?;
        self.http
            .post(&url, message, self.token.as_deref(), args)
            .await
    }

    /// Issue a mutating call with typed arguments
    async fn call_typed<A: Serialize>(&self, message: &str, args: &A) -> Result<Reply, TransportError> {
        let args = serde_json::to_value(args).map_err(|source| TransportError::Decode {
            message: message.to_string(),
            source,
        })?;
        let reply = self.call(message, &args).await?;
        serde_json::from_value(reply).map_err(|source| TransportError::Decode {
            message: message.to_string(),
            source,
        })
    }

    /// Issue a dump and decode every record
    async fn dump_typed<T: DeserializeOwned>(&self, message: &str) -> Result<Vec<T>, TransportError> {
        let records = check_dump(message, self.call(message, &empty_args()).await?)?;
        serde_json::from_value(records).map_err(|source| TransportError::Decode {
            message: message.to_string(),
            source,
        })
    }
}

fn empty_args() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A dump reply is either the record list or an object with a failing `retval`
pub fn check_dump(message: &str, reply: Value) -> Result<Value, TransportError> {
    let retval = reply
        .as_object()
        .and_then(|obj| obj.get("retval"))
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    if retval != 0 {
        return Err(TransportError::Retval {
            message: message.to_string(),
            retval: i32::try_from(retval).unwrap_or(i32::MIN),
        });
    }

    Ok(reply)
}

impl Dataplane for VppClient {
    async fn show_version(&self) -> Result<String, TransportError> {
        let reply: Reply = self.call_typed("show_version", &empty_args()).await?;
        if !reply.is_ok() {
            return Err(TransportError::Retval {
                message: "show_version".to_string(),
                retval: reply.retval,
            });
        }
        reply
            .fields
            .get("version")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| TransportError::Unavailable("show_version reply has no version".to_string()))
    }

    async fn bridge_domain_dump(&self) -> Result<Vec<BridgeDomainDetails>, TransportError> {
        self.dump_typed("bridge_domain_dump").await
    }

    async fn bridge_domain_add_del(
        &self,
        variant: Variant,
        args: &BridgeDomainAddDel,
    ) -> Result<Reply, TransportError> {
        self.call_typed(&variant.message("bridge_domain_add_del"), args)
            .await
    }

    async fn sw_interface_vhost_user_dump(&self) -> Result<Vec<VhostUserDetails>, TransportError> {
        self.dump_typed("sw_interface_vhost_user_dump").await
    }

    async fn create_vhost_user_if(
        &self,
        variant: Variant,
        args: &CreateVhostUserIf,
    ) -> Result<Reply, TransportError> {
        self.call_typed(&variant.message("create_vhost_user_if"), args)
            .await
    }

    async fn modify_vhost_user_if(
        &self,
        variant: Variant,
        args: &ModifyVhostUserIf,
    ) -> Result<Reply, TransportError> {
        self.call_typed(&variant.message("modify_vhost_user_if"), args)
            .await
    }

    async fn delete_vhost_user_if(&self, args: &DeleteVhostUserIf) -> Result<Reply, TransportError> {
        self.call_typed("delete_vhost_user_if", args).await
    }

    async fn dump(&self, query: &QueryDef) -> Result<Value, TransportError> {
        let reply = self.call(query.name, &empty_args()).await?;
        check_dump(query.name, reply)
    }
}
