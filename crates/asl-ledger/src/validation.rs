use std::collections::HashSet;

use asl_types::Height;

use crate::block::{Block, GENESIS_HASH};

/// Result of block chain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainReport {
    pub block_count: u64,
    pub hash_chain_valid: bool,
    pub heights_monotonic: bool,
    pub violations: Vec<Violation>,
}

impl ChainReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub height: Height,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    HeightGap,
    HashChainBreak,
    HashMismatch,
    TimestampRegression,
    DuplicateIntent,
}

/// Block chain integrity validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Check heights, hash links, content hashes, timestamps, and that no
    /// intent is committed twice.
    pub fn validate(blocks: &[Block]) -> ChainReport {
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut heights_monotonic = true;
        let mut seen_intents = HashSet::new();

        for (index, block) in blocks.iter().enumerate() {
            let expected_height = (index + 1) as Height;
            if block.height != expected_height {
                heights_monotonic = false;
                violations.push(Violation {
                    height: block.height,
                    kind: ViolationKind::HeightGap,
                    description: format!("expected height {expected_height}, got {}", block.height),
                });
            }

            let parent = index.checked_sub(1).map(|i| &blocks[i]);
            let expected_prev = parent.map(|p| p.block_hash).unwrap_or(GENESIS_HASH);
            if block.prev_hash != expected_prev {
                hash_chain_valid = false;
                violations.push(Violation {
                    height: block.height,
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            match block.compute_hash() {
                Ok(hash) if hash == block.block_hash => {}
                Ok(_) => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        height: block.height,
                        kind: ViolationKind::HashMismatch,
                        description: "block hash does not match computed".into(),
                    });
                }
                Err(e) => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        height: block.height,
                        kind: ViolationKind::HashMismatch,
                        description: format!("block hash could not be computed: {e}"),
                    });
                }
            }

            if let Some(p) = parent {
                if block.timestamp_ms < p.timestamp_ms {
                    violations.push(Violation {
                        height: block.height,
                        kind: ViolationKind::TimestampRegression,
                        description: format!(
                            "timestamp {} precedes parent {}",
                            block.timestamp_ms, p.timestamp_ms
                        ),
                    });
                }
            }

            for committed in &block.committed {
                if !seen_intents.insert(committed.intent.id) {
                    violations.push(Violation {
                        height: block.height,
                        kind: ViolationKind::DuplicateIntent,
                        description: format!("intent {} committed more than once", committed.intent.id),
                    });
                }
            }
        }

        ChainReport {
            block_count: blocks.len() as u64,
            hash_chain_valid,
            heights_monotonic,
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for _ in 0..len {
            let block = Block::seal(blocks.last(), 0, vec![], vec![], vec![]).unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn valid_chain_passes() {
        let report = ChainValidator::validate(&chain(3));
        assert!(report.is_valid());
        assert_eq!(report.block_count, 3);
    }

    #[test]
    fn empty_chain_is_valid() {
        assert!(ChainValidator::validate(&[]).is_valid());
    }

    #[test]
    fn broken_link_is_reported() {
        let mut blocks = chain(3);
        blocks[1].prev_hash = [9; 32];
        let report = ChainValidator::validate(&blocks);
        assert!(!report.hash_chain_valid);
        let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
        // The link and the block's own content hash both break.
        assert!(kinds.contains(&ViolationKind::HashChainBreak));
        assert!(kinds.contains(&ViolationKind::HashMismatch));
    }

    #[test]
    fn height_gap_is_reported() {
        let mut blocks = chain(2);
        blocks.remove(0);
        let report = ChainValidator::validate(&blocks);
        assert!(!report.heights_monotonic);
        assert_eq!(report.violations[0].kind, ViolationKind::HeightGap);
    }
}
