use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use asl_gate::Intent;
use asl_registry::CertKind;
use asl_types::{AccountName, Address, ErrorKind, Height, IntentId, Symbol};

use crate::error::LedgerError;

/// Hash of the block before height 1.
pub const GENESIS_HASH: [u8; 32] = [0; 32];

/// A registry operation applied at submission time, recorded in the next
/// block so replay can reproduce it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LocalOp {
    Created { intent: Intent },
    Deleted { actor: AccountName, symbol: Symbol },
    CertIssued {
        actor: AccountName,
        symbol: Symbol,
        kind: CertKind,
        owner: AccountName,
        address: Address,
    },
}

/// An intent applied by a confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedIntent {
    /// Position among the block's committed intents; names its outputs.
    pub index: u32,
    pub intent: Intent,
}

/// An intent that failed re-validation at confirmation time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedIntent {
    pub intent: Intent,
    pub kind: ErrorKind,
    pub reason: String,
}

/// The record of one confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: Height,
    pub prev_hash: [u8; 32],
    /// BLAKE3 over the block with this field zeroed.
    pub block_hash: [u8; 32],
    /// Milliseconds since the Unix epoch; never earlier than the parent.
    pub timestamp_ms: u64,
    pub node_id: u16,
    pub local: Vec<LocalOp>,
    pub committed: Vec<CommittedIntent>,
    pub rejected: Vec<RejectedIntent>,
}

impl Block {
    /// Seal a new block on top of `parent` (or genesis).
    pub fn seal(
        parent: Option<&Block>,
        node_id: u16,
        local: Vec<LocalOp>,
        committed: Vec<CommittedIntent>,
        rejected: Vec<RejectedIntent>,
    ) -> Result<Self, LedgerError> {
        let (height, prev_hash, floor) = match parent {
            Some(p) => (p.height + 1, p.block_hash, p.timestamp_ms),
            None => (1, GENESIS_HASH, 0),
        };
        let mut block = Self {
            height,
            prev_hash,
            block_hash: [0; 32],
            timestamp_ms: now_ms().max(floor),
            node_id,
            local,
            committed,
            rejected,
        };
        block.block_hash = block.compute_hash()?;
        Ok(block)
    }

    /// Recompute the hash of this block's content.
    pub fn compute_hash(&self) -> Result<[u8; 32], LedgerError> {
        let mut canonical = self.clone();
        canonical.block_hash = [0; 32];
        let encoded = serde_json::to_vec(&canonical)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"asl-block-v1:");
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.block_hash)
    }

    pub fn is_committed(&self, id: &IntentId) -> bool {
        self.committed.iter().any(|c| &c.intent.id == id)
    }

    pub fn rejection(&self, id: &IntentId) -> Option<&RejectedIntent> {
        self.rejected.iter().find(|r| &r.intent.id == id)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
