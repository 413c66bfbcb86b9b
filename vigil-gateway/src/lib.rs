pub mod error;
pub mod message;
pub mod price;
pub mod rpc;
pub mod signer;

use async_trait::async_trait;
use vigil_types::{Instruction, Pubkey};

pub use error::{GatewayError, KeyError, PriceError};
pub use price::{HttpPriceSource, PriceSource, StaticPriceSource, PRICE_REQUEST_TIMEOUT};
pub use rpc::{Commitment, RpcConfig, RpcGateway};
pub use signer::Keypair;

/// Read and write access to the ledger. Implementations must be safe to
/// share between controllers.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Raw account data, or `AccountNotFound` when nothing backs `address`.
    async fn get_account_bytes(&self, address: &Pubkey) -> Result<Vec<u8>, GatewayError>;

    /// Signs, sends and waits for confirmation. Returns the transaction
    /// signature.
    async fn submit_instruction(&self, instruction: &Instruction) -> Result<String, GatewayError>;

    /// The key that signs submissions, if one is configured.
    fn authority(&self) -> Option<Pubkey>;
}

#[cfg(test)]
mod tests;
