use crate::error::GatewayError;
use crate::message::{serialize_transaction, Message};
use crate::signer::Keypair;
use crate::ChainGateway;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use vigil_types::{Instruction, Pubkey};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment: Commitment,
    /// Upper bound on any single HTTP request to the node.
    pub request_timeout: Duration,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            commitment: Commitment::Confirmed,
            request_timeout: Duration::from_secs(30),
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct AccountInfo {
    data: (String, String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    err: Option<Value>,
    confirmation_status: Option<Commitment>,
}

/// JSON-RPC chain client: reads accounts and signs, sends and confirms
/// single-instruction transactions with the configured authority.
pub struct RpcGateway {
    client: Client,
    config: RpcConfig,
    signer: Option<Arc<Keypair>>,
    next_id: AtomicU64,
}

impl RpcGateway {
    pub fn new(config: RpcConfig, signer: Option<Arc<Keypair>>) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            config,
            signer,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let resp: RpcResponse<T> = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(err) = resp.error {
            return Err(GatewayError::Rpc { code: err.code, message: err.message });
        }
        resp.result
            .ok_or_else(|| GatewayError::InvalidResponse(format!("{} returned no result", method)))
    }

    pub async fn latest_blockhash(&self) -> Result<[u8; 32], GatewayError> {
        let resp: WithContext<LatestBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": self.config.commitment.as_str() }]))
            .await?;
        let bytes = bs58::decode(&resp.value.blockhash)
            .into_vec()
            .map_err(|e| GatewayError::InvalidResponse(format!("blockhash: {}", e)))?;
        bytes
            .try_into()
            .map_err(|_| GatewayError::InvalidResponse("blockhash is not 32 bytes".into()))
    }

    async fn send_raw(&self, wire: &[u8]) -> Result<String, GatewayError> {
        self.call(
            "sendTransaction",
            json!([
                BASE64.encode(wire),
                { "encoding": "base64", "preflightCommitment": self.config.commitment.as_str() }
            ]),
        )
        .await
    }

    async fn confirm(&self, signature: &str) -> Result<(), GatewayError> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        loop {
            let resp: WithContext<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature]]))
                .await?;
            if let Some(Some(status)) = resp.value.into_iter().next() {
                if let Some(err) = status.err {
                    return Err(GatewayError::Submission {
                        signature: signature.to_string(),
                        reason: err.to_string(),
                    });
                }
                if status.confirmation_status.is_some_and(|c| c >= self.config.commitment) {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(GatewayError::Timeout(signature.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    async fn get_account_bytes(&self, address: &Pubkey) -> Result<Vec<u8>, GatewayError> {
        let resp: WithContext<Option<AccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "base64", "commitment": self.config.commitment.as_str() }]),
            )
            .await?;
        let info = resp.value.ok_or(GatewayError::AccountNotFound(*address))?;
        BASE64
            .decode(info.data.0)
            .map_err(|e| GatewayError::InvalidResponse(format!("account data: {}", e)))
    }

    async fn submit_instruction(&self, instruction: &Instruction) -> Result<String, GatewayError> {
        let signer = self.signer.as_ref().ok_or(GatewayError::MissingSigner)?;
        let blockhash = self.latest_blockhash().await?;
        let message = Message::compile(signer.pubkey(), std::slice::from_ref(instruction), blockhash)?;
        let message_bytes = message.serialize()?;
        let signature = signer.sign(&message_bytes);
        let wire = serialize_transaction(&[signature], &message_bytes)?;

        let sent = self.send_raw(&wire).await?;
        debug!("Sent transaction {} ({} bytes)", sent, wire.len());
        self.confirm(&sent).await?;
        info!("Transaction {} reached {} commitment", sent, self.config.commitment.as_str());
        Ok(sent)
    }

    fn authority(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|s| s.pubkey())
    }
}
