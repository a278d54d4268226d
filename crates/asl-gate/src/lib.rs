//! Intent validation pipeline for the asset ledger (ASL).
//!
//! Every intent passes through the gate twice: once when it is submitted,
//! against confirmed state plus everything already pending, and once more
//! when a confirmation applies it. The gate runs a pipeline of stages and
//! produces an accept/reject verdict carrying an [`ErrorKind`](asl_types::ErrorKind).
//!
//! # Default pipeline
//!
//! 1. [`StructureStage`]: zero quantities, precision, description length
//! 2. [`RegistryStage`]: symbol existence, ownership, issue-once
//! 3. [`AuthorityStage`]: the actor may spend from the source address
//! 4. [`FundsStage`]: the source holds enough confirmed funds
//!
//! Stages never mutate state, so a rejected intent leaves the ledger
//! untouched.

pub mod config;
pub mod error;
pub mod gate;
pub mod intent;
pub mod stage;
pub mod stages;
pub mod wallet;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{GateResult, IntentGate, Verdict};
pub use intent::{Action, Intent, IntentKind, PendingSummary};
pub use stage::{GateContext, GateStage, StageDecision, StageResult};
pub use stages::{AuthorityStage, FundsStage, RegistryStage, StructureStage};
pub use wallet::{InMemoryWallet, Wallet};

#[cfg(test)]
mod tests {
    use super::*;
    use asl_registry::InMemoryRegistry;
    use asl_store::{InMemoryBalanceStore, Origin};
    use asl_types::{AccountName, Address, DecimalNumber, ErrorKind, Quantity, Symbol};

    struct Fixture {
        registry: InMemoryRegistry,
        store: InMemoryBalanceStore,
        wallet: InMemoryWallet,
        alice: Address,
        bob: Address,
    }

    fn acct(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    /// GOLD issued to alice (10_000 at height 1), SILVER created but unissued.
    fn fixture() -> Fixture {
        let wallet = InMemoryWallet::new();
        let alice = wallet.create_account(&acct("alice"));
        let bob = wallet.create_account(&acct("bob"));

        let mut registry = InMemoryRegistry::new();
        registry
            .create(sym("GOLD"), acct("alice"), DecimalNumber::ZERO, "")
            .unwrap();
        registry
            .issue(&sym("GOLD"), &acct("alice"), alice.clone(), Quantity::new(10_000), 1)
            .unwrap();
        registry
            .create(sym("SILVER"), acct("alice"), DecimalNumber::ZERO, "")
            .unwrap();

        let mut store = InMemoryBalanceStore::new();
        store
            .insert_issue(Origin::new(1, 0), alice.clone(), sym("GOLD"), Quantity::new(10_000), DecimalNumber::ZERO)
            .unwrap();

        Fixture {
            registry,
            store,
            wallet,
            alice,
            bob,
        }
    }

    fn run(gate: &IntentGate, f: &Fixture, pending: &PendingSummary, intent: &Intent) -> GateResult {
        let context = GateContext::new(&f.registry, &f.store, &f.wallet, pending, 2);
        gate.evaluate(intent, &context).unwrap()
    }

    fn rejected_kind(result: &GateResult) -> Option<ErrorKind> {
        match &result.verdict {
            Verdict::Rejected { kind, .. } => Some(*kind),
            Verdict::Accepted => None,
        }
    }

    fn send(f: &Fixture, actor: &str, quantity: u64) -> Intent {
        Intent::new(
            acct(actor),
            Action::Send {
                from: f.alice.clone(),
                to: f.bob.clone(),
                symbol: sym("GOLD"),
                quantity: Quantity::new(quantity),
            },
        )
    }

    // -----------------------------------------------------------------------
    // 1. Pipeline shape
    // -----------------------------------------------------------------------

    #[test]
    fn default_pipeline_runs_all_stages_on_accept() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        assert_eq!(gate.stage_names(), vec!["structure", "registry", "authority", "funds"]);

        let result = run(&gate, &f, &PendingSummary::new(), &send(&f, "alice", 100));
        assert!(result.is_accepted());
        assert_eq!(result.stage_results.len(), 4);
        assert!(result.stage_results.iter().all(|r| r.passed));
    }

    #[test]
    fn permissive_pipeline_skips_authority() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::permissive());
        assert_eq!(gate.stage_count(), 3);

        let result = run(&gate, &f, &PendingSummary::new(), &send(&f, "bob", 100));
        assert!(result.is_accepted());
    }

    #[test]
    fn pipeline_is_fail_fast() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let result = run(&gate, &f, &PendingSummary::new(), &send(&f, "alice", 0));
        assert_eq!(rejected_kind(&result), Some(ErrorKind::InvalidArgument));
        assert_eq!(result.stage_results.len(), 1);
        assert!(!result.stage_results[0].passed);
    }

    #[test]
    fn into_result_carries_kind() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let err = run(&gate, &f, &PendingSummary::new(), &send(&f, "bob", 1))
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnauthorizedSpend);
    }

    // -----------------------------------------------------------------------
    // 2. Registry rules
    // -----------------------------------------------------------------------

    #[test]
    fn create_of_existing_symbol_is_duplicate() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let intent = Intent::new(
            acct("bob"),
            Action::Create {
                symbol: sym("SILVER"),
                decimal_number: DecimalNumber::ZERO,
                description: String::new(),
            },
        );
        let result = run(&gate, &f, &PendingSummary::new(), &intent);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::DuplicateSymbol));
    }

    #[test]
    fn oversized_description_is_invalid() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let intent = Intent::new(
            acct("bob"),
            Action::Create {
                symbol: sym("COPPER"),
                decimal_number: DecimalNumber::ZERO,
                description: "x".repeat(65),
            },
        );
        let result = run(&gate, &f, &PendingSummary::new(), &intent);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::InvalidArgument));
    }

    #[test]
    fn issue_rules() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let issue = |actor: &str, symbol: &str| {
            Intent::new(
                acct(actor),
                Action::Issue {
                    symbol: sym(symbol),
                    to: f.alice.clone(),
                    quantity: Quantity::new(5),
                },
            )
        };
        let none = PendingSummary::new();

        assert!(run(&gate, &f, &none, &issue("alice", "SILVER")).is_accepted());
        assert_eq!(
            rejected_kind(&run(&gate, &f, &none, &issue("alice", "GOLD"))),
            Some(ErrorKind::AlreadyIssued)
        );
        assert_eq!(
            rejected_kind(&run(&gate, &f, &none, &issue("bob", "SILVER"))),
            Some(ErrorKind::NotOwner)
        );
        assert_eq!(
            rejected_kind(&run(&gate, &f, &none, &issue("alice", "NOPE"))),
            Some(ErrorKind::NotFound)
        );

        let pending = PendingSummary::from_actions([&issue("alice", "SILVER").action]);
        assert_eq!(
            rejected_kind(&run(&gate, &f, &pending, &issue("alice", "SILVER"))),
            Some(ErrorKind::AlreadyIssued)
        );
    }

    #[test]
    fn spending_unissued_asset() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let burn = Intent::new(
            acct("alice"),
            Action::Burn {
                owner: f.alice.clone(),
                symbol: sym("SILVER"),
                quantity: Quantity::new(1),
            },
        );
        let result = run(&gate, &f, &PendingSummary::new(), &burn);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::NotFound));

        let issue = Action::Issue {
            symbol: sym("SILVER"),
            to: f.alice.clone(),
            quantity: Quantity::new(5),
        };
        let pending = PendingSummary::from_actions([&issue]);
        let result = run(&gate, &f, &pending, &burn);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::UnknownInput));
    }

    // -----------------------------------------------------------------------
    // 3. Authority and funds
    // -----------------------------------------------------------------------

    #[test]
    fn send_from_requires_grant() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let intent = Intent::new(
            acct("bob"),
            Action::SendFrom {
                from: f.alice.clone(),
                to: f.bob.clone(),
                symbol: sym("GOLD"),
                quantity: Quantity::new(10),
            },
        );
        let result = run(&gate, &f, &PendingSummary::new(), &intent);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::UnauthorizedSpend));

        f.wallet.grant_spend(&acct("bob"), &f.alice);
        assert!(run(&gate, &f, &PendingSummary::new(), &intent).is_accepted());
    }

    #[test]
    fn over_burn_is_insufficient_funds() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let burn = Intent::new(
            acct("alice"),
            Action::Burn {
                owner: f.alice.clone(),
                symbol: sym("GOLD"),
                quantity: Quantity::new(10_001),
            },
        );
        let result = run(&gate, &f, &PendingSummary::new(), &burn);
        assert_eq!(rejected_kind(&result), Some(ErrorKind::InsufficientFunds));
        assert_eq!(ErrorKind::InsufficientFunds.code(), 5001);
    }

    #[test]
    fn pending_spends_cannot_double_spend() {
        let f = fixture();
        let gate = IntentGate::with_default_stages(GateConfig::default());
        let first = send(&f, "alice", 6_000);
        let pending = PendingSummary::from_actions([&first.action]);
        let result = run(&gate, &f, &pending, &send(&f, "alice", 6_000));
        assert_eq!(rejected_kind(&result), Some(ErrorKind::InsufficientFunds));
        assert!(run(&gate, &f, &pending, &send(&f, "alice", 4_000)).is_accepted());
    }
}
