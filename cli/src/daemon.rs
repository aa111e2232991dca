//! # Daemon Client
//!
//! JSON-RPC 2.0 over HTTP POST to the local wallet daemon. The daemon owns
//! keys, balances, and transaction construction; this module only moves
//! requests and answers across the wire and implements
//! [`ProposalProvider`] on top of them.
//!
//! ## Method Index
//!
//! | Method               | Params                          | Result                   |
//! |----------------------|---------------------------------|--------------------------|
//! | `build_transaction`  | `amount`, `fee`, `recipient`    | proposal or `null`       |
//! | `open_gift_code`     | `gift_code`                     | proposal or `null`       |
//! | `submit_transaction` | `tx_proposal`                   | anything                 |
//! | `get_account`        | none                            | `{address, name, balance}` |
//! | `get_ledger_status`  | none                            | block indices            |
//!
//! Amounts travel as strings of picoMOB digits.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use mobwallet_core::account::Account;
use mobwallet_core::amount::MonetaryAmount;
use mobwallet_core::ledger::LedgerStatus;
use mobwallet_core::staging::{
    ProposalDraft, ProposalProvider, ProposalToken, ProviderError, TransactionProposal,
};

// ---------------------------------------------------------------------------
// Wire Types
// ---------------------------------------------------------------------------

/// Daemon methods the wallet calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonMethod {
    BuildTransaction,
    OpenGiftCode,
    SubmitTransaction,
    GetAccount,
    GetLedgerStatus,
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: u64,
    pub method: DaemonMethod,
    /// Method-specific parameters.
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: DaemonMethod, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response. A `null` result and an absent one both
/// deserialize to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// How the daemon spells a proposal.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProposalReply {
    #[serde(default)]
    fee_confirmation: Option<MonetaryAmount>,
    #[serde(default)]
    total_value_confirmation: Option<MonetaryAmount>,
    #[serde(default)]
    receiver: Option<String>,
    #[serde(default)]
    tx_proposal: Option<Value>,
}

impl From<ProposalReply> for ProposalDraft {
    fn from(reply: ProposalReply) -> Self {
        ProposalDraft {
            fee: reply.fee_confirmation,
            total_value: reply.total_value_confirmation,
            receiver: reply.receiver,
            token: reply.tx_proposal.map(ProposalToken::new),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountReply {
    address: String,
    #[serde(default)]
    name: Option<String>,
    balance: MonetaryAmount,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures talking to the daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The HTTP request failed or the body was not JSON-RPC.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The daemon answered with a JSON-RPC error. Displays the daemon's
    /// message verbatim.
    #[error("{message}")]
    Rpc { code: i32, message: String },

    /// A method that must return something returned nothing.
    #[error("daemon returned no result for {0:?}")]
    MissingResult(DaemonMethod),

    /// The result did not have the expected shape.
    #[error("unexpected daemon reply for {method:?}: {source}")]
    Decode {
        method: DaemonMethod,
        #[source]
        source: serde_json::Error,
    },
}

impl From<DaemonError> for ProviderError {
    fn from(err: DaemonError) -> Self {
        ProviderError::new(err.to_string())
    }
}

/// Unwraps a response into its result, turning an error object into
/// [`DaemonError::Rpc`].
fn into_result(response: RpcResponse) -> Result<Option<Value>, DaemonError> {
    if let Some(error) = response.error {
        return Err(DaemonError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    Ok(response.result)
}

fn decode<T: serde::de::DeserializeOwned>(
    method: DaemonMethod,
    value: Value,
) -> Result<T, DaemonError> {
    serde_json::from_value(value).map_err(|source| DaemonError::Decode { method, source })
}

fn decode_proposal(
    method: DaemonMethod,
    result: Option<Value>,
) -> Result<Option<ProposalDraft>, DaemonError> {
    match result {
        None => Ok(None),
        Some(value) => {
            let reply: ProposalReply = decode(method, value)?;
            Ok(Some(reply.into()))
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP JSON-RPC client for the wallet daemon.
pub struct DaemonClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl DaemonClient {
    /// Creates a client for the daemon at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, DaemonError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: DaemonMethod, params: Value) -> Result<Option<Value>, DaemonError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!(id, ?method, "daemon call");

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        into_result(response)
    }

    async fn call_required<T: serde::de::DeserializeOwned>(
        &self,
        method: DaemonMethod,
        params: Value,
    ) -> Result<T, DaemonError> {
        let value = self
            .call(method, params)
            .await?
            .ok_or(DaemonError::MissingResult(method))?;
        decode(method, value)
    }

    /// The wallet's account and its current balance.
    pub async fn get_account(&self) -> Result<Account, DaemonError> {
        let reply: AccountReply = self.call_required(DaemonMethod::GetAccount, json!({})).await?;
        Ok(Account::new(reply.address, reply.name, reply.balance))
    }

    /// Block indices for the sync check.
    pub async fn get_ledger_status(&self) -> Result<LedgerStatus, DaemonError> {
        self.call_required(DaemonMethod::GetLedgerStatus, json!({}))
            .await
    }
}

#[async_trait]
impl ProposalProvider for DaemonClient {
    async fn build_transaction(
        &self,
        amount: &MonetaryAmount,
        fee: &MonetaryAmount,
        recipient: &str,
    ) -> Result<Option<ProposalDraft>, ProviderError> {
        let params = json!({
            "amount": amount,
            "fee": fee,
            "recipient": recipient,
        });
        let result = self.call(DaemonMethod::BuildTransaction, params).await?;
        Ok(decode_proposal(DaemonMethod::BuildTransaction, result)?)
    }

    async fn open_gift_code(&self, code: &str) -> Result<Option<ProposalDraft>, ProviderError> {
        let result = self
            .call(DaemonMethod::OpenGiftCode, json!({ "gift_code": code }))
            .await?;
        Ok(decode_proposal(DaemonMethod::OpenGiftCode, result)?)
    }

    async fn submit_transaction(&self, proposal: &TransactionProposal) -> Result<(), ProviderError> {
        self.call(
            DaemonMethod::SubmitTransaction,
            json!({ "tx_proposal": proposal.token() }),
        )
        .await?;
        Ok(())
    }
}
