use asl_store::Origin;

use crate::block::{Block, LocalOp};
use crate::error::LedgerError;
use crate::state::LedgerSnapshot;

/// Result of replaying a block sequence into confirmed state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub applied_intents: u64,
    pub applied_local_ops: u64,
    pub evaluated_blocks: u64,
    pub state: LedgerSnapshot,
}

/// Deterministic replay of committed blocks.
///
/// Replay trusts the validation already recorded in the blocks: only
/// committed intents are applied and rejected ones are skipped. The registry
/// and store still enforce their own invariants, so a block that could not
/// have been produced by a ledger fails replay with an error.
pub struct ReplayEngine;

impl ReplayEngine {
    pub fn replay_from_genesis(blocks: &[Block]) -> Result<ReplayResult, LedgerError> {
        Self::replay_onto(LedgerSnapshot::default(), blocks)
    }

    /// Replay `blocks` on top of an earlier snapshot.
    ///
    /// Blocks at or below the snapshot height are skipped.
    pub fn replay_onto(
        mut state: LedgerSnapshot,
        blocks: &[Block],
    ) -> Result<ReplayResult, LedgerError> {
        let mut applied_intents = 0u64;
        let mut applied_local_ops = 0u64;
        let mut evaluated_blocks = 0u64;

        let start = state.height;
        for block in blocks.iter().filter(|b| b.height > start) {
            if block.height != state.height + 1 {
                return Err(LedgerError::IntegrityViolation {
                    height: block.height,
                    reason: format!("replay expected height {}", state.height + 1),
                });
            }
            evaluated_blocks += 1;
            for op in &block.local {
                state.apply_local(op)?;
                applied_local_ops += 1;
            }
            for committed in &block.committed {
                state.apply_intent(Origin::new(block.height, committed.index), &committed.intent)?;
                applied_intents += 1;
            }
            state.height = block.height;
        }

        Ok(ReplayResult {
            applied_intents,
            applied_local_ops,
            evaluated_blocks,
            state,
        })
    }

    /// Apply registry operations that have not been sealed into a block yet.
    pub fn apply_journal(state: &mut LedgerSnapshot, journal: &[LocalOp]) -> Result<(), LedgerError> {
        for op in journal {
            state.apply_local(op)?;
        }
        Ok(())
    }

    /// Whether replaying from genesis and from `snapshot` reach the same state.
    pub fn verify_snapshot_convergence(
        blocks: &[Block],
        snapshot: &LedgerSnapshot,
    ) -> Result<bool, LedgerError> {
        let full = Self::replay_from_genesis(blocks)?;
        let tail = Self::replay_onto(snapshot.clone(), blocks)?;
        Ok(full.state.to_bytes()? == tail.state.to_bytes()?)
    }
}
