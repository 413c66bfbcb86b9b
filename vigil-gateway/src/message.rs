//! Legacy transaction message compilation and wire encoding.
//!
//! Account keys are ordered fee payer first, then signer-writable,
//! signer-readonly, writable, readonly. Lengths use the compact-u16
//! ("shortvec") encoding.

use thiserror::Error;
use vigil_types::{Instruction, Pubkey};

pub const MAX_ACCOUNT_KEYS: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("transaction references {0} accounts, limit is {MAX_ACCOUNT_KEYS}")]
    TooManyAccounts(usize),
    #[error("account {0} must sign but only the fee payer can")]
    UnexpectedSigner(Pubkey),
    #[error("length {0} does not fit compact-u16")]
    LengthOverflow(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Copy)]
struct KeyFlags {
    key: Pubkey,
    signer: bool,
    writable: bool,
}

pub fn encode_compact_u16(out: &mut Vec<u8>, len: usize) -> Result<(), MessageError> {
    if len > u16::MAX as usize {
        return Err(MessageError::LengthOverflow(len));
    }
    let mut rem = len;
    loop {
        let byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

impl Message {
    pub fn compile(payer: Pubkey, instructions: &[Instruction], recent_blockhash: [u8; 32]) -> Result<Self, MessageError> {
        let mut flags: Vec<KeyFlags> = vec![KeyFlags { key: payer, signer: true, writable: true }];
        let mut merge = |key: Pubkey, signer: bool, writable: bool| {
            if let Some(f) = flags.iter_mut().find(|f| f.key == key) {
                f.signer |= signer;
                f.writable |= writable;
            } else {
                flags.push(KeyFlags { key, signer, writable });
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                merge(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            merge(ix.program_id, false, false);
        }

        if let Some(extra) = flags.iter().skip(1).find(|f| f.signer) {
            return Err(MessageError::UnexpectedSigner(extra.key));
        }
        if flags.len() > MAX_ACCOUNT_KEYS {
            return Err(MessageError::TooManyAccounts(flags.len()));
        }

        // Stable partition; the payer is already first.
        let rank = |f: &KeyFlags| match (f.signer, f.writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        let (payer_flags, rest) = flags.split_at(1);
        let mut ordered: Vec<KeyFlags> = payer_flags.to_vec();
        let mut rest = rest.to_vec();
        rest.sort_by_key(rank);
        ordered.extend(rest);

        let header = MessageHeader {
            num_required_signatures: ordered.iter().filter(|f| f.signer).count() as u8,
            num_readonly_signed_accounts: ordered.iter().filter(|f| f.signer && !f.writable).count() as u8,
            num_readonly_unsigned_accounts: ordered.iter().filter(|f| !f.signer && !f.writable).count() as u8,
        };
        let account_keys: Vec<Pubkey> = ordered.iter().map(|f| f.key).collect();
        let index_of = |key: &Pubkey| account_keys.iter().position(|k| k == key).unwrap_or_default() as u8;

        let compiled = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, MessageError> {
        let mut out = vec![
            self.header.num_required_signatures,
            self.header.num_readonly_signed_accounts,
            self.header.num_readonly_unsigned_accounts,
        ];
        encode_compact_u16(&mut out, self.account_keys.len())?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(&self.recent_blockhash);
        encode_compact_u16(&mut out, self.instructions.len())?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_compact_u16(&mut out, ix.accounts.len())?;
            out.extend_from_slice(&ix.accounts);
            encode_compact_u16(&mut out, ix.data.len())?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }
}

/// `shortvec(signatures) ++ signatures ++ message`.
pub fn serialize_transaction(signatures: &[[u8; 64]], message_bytes: &[u8]) -> Result<Vec<u8>, MessageError> {
    let mut out = Vec::with_capacity(1 + signatures.len() * 64 + message_bytes.len());
    encode_compact_u16(&mut out, signatures.len())?;
    for sig in signatures {
        out.extend_from_slice(sig);
    }
    out.extend_from_slice(message_bytes);
    Ok(out)
}
