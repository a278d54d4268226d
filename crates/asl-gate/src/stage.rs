use std::time::Duration;

use asl_registry::AssetReader;
use asl_store::BalanceReader;
use asl_types::{ErrorKind, Height};

use crate::error::GateError;
use crate::intent::{Intent, PendingSummary};
use crate::wallet::Wallet;

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// What one stage concluded about an intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// Continue with the next stage.
    Pass,
    /// The stage failed; the intent is rejected with `kind`.
    Fail { kind: ErrorKind, reason: String },
}

impl StageDecision {
    pub fn fail(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Trace of one stage run, kept for diagnostics.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Ledger state every stage reads from.
///
/// The context borrows the confirmed registry and balances, plus a summary
/// of intents that are accepted but not yet confirmed.
pub struct GateContext<'a> {
    pub registry: &'a dyn AssetReader,
    pub balances: &'a dyn BalanceReader,
    pub wallet: &'a dyn Wallet,
    pub pending: &'a PendingSummary,
    /// Only entries funded strictly below this height count as spendable.
    pub spendable_below: Height,
}

impl<'a> GateContext<'a> {
    pub fn new(
        registry: &'a dyn AssetReader,
        balances: &'a dyn BalanceReader,
        wallet: &'a dyn Wallet,
        pending: &'a PendingSummary,
        spendable_below: Height,
    ) -> Self {
        Self {
            registry,
            balances,
            wallet,
            pending,
            spendable_below,
        }
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// One check in the gate pipeline.
///
/// Stages are evaluated in order and must not mutate ledger state. The
/// trait is object-safe and `Send + Sync` so stages can be stored in a
/// `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "structure", "funds").
    fn name(&self) -> &str;

    fn evaluate(&self, intent: &Intent, context: &GateContext<'_>)
        -> Result<StageDecision, GateError>;
}
