use crate::error::KeyError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::path::Path;
use vigil_types::Pubkey;

/// The authority key that signs every submitted transaction.
pub struct Keypair(SigningKey);

impl Keypair {
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        Self(SigningKey::generate(&mut csprng))
    }

    /// Accepts the 64-byte `secret ++ public` form used by keypair files.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: &[u8; 64] = bytes.try_into().map_err(|_| KeyError::Length(bytes.len()))?;
        SigningKey::from_keypair_bytes(arr)
            .map(Self)
            .map_err(|e| KeyError::Invalid(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_keypair_bytes()
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let content = std::fs::read_to_string(path)?;
        let bytes: Vec<u8> = serde_json::from_str(&content)?;
        Self::from_bytes(&bytes)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), KeyError> {
        let content = serde_json::to_string(&self.to_bytes().to_vec())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let sig: Signature = self.0.sign(message);
        sig.to_bytes()
    }
}

pub fn verify_signature(pubkey: &Pubkey, message: &[u8], signature_bytes: &[u8]) -> Result<(), KeyError> {
    let key = VerifyingKey::from_bytes(pubkey.as_bytes()).map_err(|_| KeyError::Invalid("public key".into()))?;
    let sig: &[u8; 64] = signature_bytes.try_into().map_err(|_| KeyError::BadSignature)?;
    key.verify(message, &Signature::from_bytes(sig))
        .map_err(|_| KeyError::BadSignature)
}
