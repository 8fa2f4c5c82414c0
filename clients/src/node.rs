//! Ledger node JSON-RPC client.
//!
//! Every call is a `POST` of `{"action": ..., ...params}` to the node URL.
//! Numeric fields arrive as decimal strings; a top-level `error` field
//! means the call failed.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use repwatch_monitor::{LedgerAccountInfo, LedgerRpc, SourceError};
use repwatch_types::{RawAmount, RepAddress};

use crate::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error text the node uses for an account with no blocks yet.
pub const ACCOUNT_NOT_FOUND: &str = "Account not found";

#[derive(Clone)]
pub struct NodeRpcClient {
    http: reqwest::Client,
    node_url: String,
}

impl NodeRpcClient {
    /// Create a client targeting the given node URL (e.g. `http://127.0.0.1:7072`).
    pub fn new(node_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Setup(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| ClientError::Setup("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        debug!(action, "node rpc call");
        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("invalid JSON response: {e}")))?;
        check_node_error(json)
    }

    /// `account_info` with representative, weight and receivable fields.
    pub async fn account_info(&self, account: &RepAddress) -> Result<LedgerAccountInfo, ClientError> {
        let result = self
            .rpc_call(
                "account_info",
                serde_json::json!({
                    "account": account,
                    "representative": "true",
                    "weight": "true",
                    "receivable": "true",
                }),
            )
            .await?;
        parse_account_info(result)
    }

    pub async fn representatives_online(&self) -> Result<Vec<RepAddress>, ClientError> {
        let result = self
            .rpc_call("representatives_online", serde_json::json!({}))
            .await?;
        parse_representatives_online(&result)
    }

    pub async fn confirmation_quorum(&self) -> Result<Option<RawAmount>, ClientError> {
        let result = self
            .rpc_call("confirmation_quorum", serde_json::json!({}))
            .await?;
        parse_confirmation_quorum(result)
    }
}

#[async_trait]
impl LedgerRpc for NodeRpcClient {
    async fn account_info(&self, account: &RepAddress) -> Result<LedgerAccountInfo, SourceError> {
        Ok(NodeRpcClient::account_info(self, account).await?)
    }

    async fn representatives_online(&self) -> Result<Vec<RepAddress>, SourceError> {
        Ok(NodeRpcClient::representatives_online(self).await?)
    }

    async fn confirmation_quorum(&self) -> Result<Option<RawAmount>, SourceError> {
        Ok(NodeRpcClient::confirmation_quorum(self).await?)
    }
}

fn check_node_error(json: serde_json::Value) -> Result<serde_json::Value, ClientError> {
    if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
        return Err(ClientError::Node(err.to_string()));
    }
    Ok(json)
}

/// `account_info` as the node sends it.
#[derive(Debug, Deserialize)]
struct AccountInfoResponse {
    #[serde(default)]
    frontier: String,
    #[serde(default)]
    open_block: String,
    #[serde(default)]
    representative_block: String,
    #[serde(default)]
    balance: RawAmount,
    #[serde(default, deserialize_with = "u64_from_string")]
    modified_timestamp: u64,
    #[serde(default, deserialize_with = "u64_from_string")]
    block_count: u64,
    #[serde(default, deserialize_with = "u64_from_string")]
    confirmation_height: u64,
    #[serde(default)]
    representative: Option<RepAddress>,
    #[serde(default)]
    weight: RawAmount,
    #[serde(default, alias = "pending")]
    receivable: RawAmount,
}

fn u64_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Number(u64),
    }
    match Wire::deserialize(deserializer)? {
        Wire::Number(n) => Ok(n),
        Wire::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn parse_account_info(json: serde_json::Value) -> Result<LedgerAccountInfo, ClientError> {
    let resp: AccountInfoResponse = serde_json::from_value(json)
        .map_err(|e| ClientError::InvalidResponse(format!("invalid account_info response: {e}")))?;
    Ok(LedgerAccountInfo {
        frontier: resp.frontier,
        open_block: resp.open_block,
        representative_block: resp.representative_block,
        balance: resp.balance,
        modified_timestamp: resp.modified_timestamp,
        block_count: resp.block_count,
        confirmation_height: resp.confirmation_height,
        representative: resp.representative,
        weight: resp.weight,
        receivable: resp.receivable,
    })
}

/// `representatives` is either a list of ids or a map. For a map, string
/// values are taken as the ids; any other value means the key is the id.
fn parse_representatives_online(json: &serde_json::Value) -> Result<Vec<RepAddress>, ClientError> {
    match json.get("representatives") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(RepAddress::from).ok_or_else(|| {
                    ClientError::InvalidResponse(format!("non-string representative: {item}"))
                })
            })
            .collect(),
        Some(serde_json::Value::Object(map)) => Ok(map
            .iter()
            .map(|(key, value)| match value.as_str() {
                Some(id) if !id.is_empty() && !id.chars().all(|c| c.is_ascii_digit()) => {
                    RepAddress::from(id)
                }
                _ => RepAddress::new(key.as_str()),
            })
            .collect()),
        Some(other) => Err(ClientError::InvalidResponse(format!(
            "unexpected representatives shape: {other}"
        ))),
    }
}

fn parse_confirmation_quorum(json: serde_json::Value) -> Result<Option<RawAmount>, ClientError> {
    #[derive(Deserialize)]
    struct QuorumResponse {
        #[serde(default)]
        online_stake_total: Option<RawAmount>,
    }
    if json.is_null() {
        return Ok(None);
    }
    let resp: QuorumResponse = serde_json::from_value(json).map_err(|e| {
        ClientError::InvalidResponse(format!("invalid confirmation_quorum response: {e}"))
    })?;
    Ok(resp.online_stake_total)
}
