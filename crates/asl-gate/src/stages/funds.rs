use asl_types::{ErrorKind, Quantity};

use crate::error::GateError;
use crate::intent::Intent;
use crate::stage::{GateContext, GateStage, StageDecision};

/// Balance sufficiency stage.
///
/// Available funds are the confirmed, spendable balance of the source minus
/// whatever pending intents already debit from it. When the request could
/// only be covered by outputs that are not yet spendable (produced at the
/// current height, or credited by a pending intent) the intent fails with
/// `UnknownInput`; otherwise a short balance is `InsufficientFunds`.
pub struct FundsStage;

impl GateStage for FundsStage {
    fn name(&self) -> &str {
        "funds"
    }

    fn evaluate(
        &self,
        intent: &Intent,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let (Some(source), Some(quantity)) = (intent.action.source(), intent.action.quantity())
        else {
            return Ok(StageDecision::Pass);
        };
        let symbol = intent.action.symbol();

        let spendable = context
            .balances
            .spendable_balance(source, symbol, context.spendable_below);
        let available = spendable.saturating_sub(context.pending.debit(source, symbol));
        if quantity <= available {
            return Ok(StageDecision::Pass);
        }

        let live = context.balances.balance(source, symbol);
        let unconfirmed = live.saturating_sub(spendable).raw()
            .saturating_add(context.pending.credit(source, symbol).raw());
        if available.raw().saturating_add(unconfirmed) >= quantity.raw() {
            return Ok(StageDecision::fail(
                ErrorKind::UnknownInput,
                format!(
                    "{symbol} at {source}: {quantity} requested but only {available} is confirmed and spendable"
                ),
            ));
        }

        Ok(StageDecision::fail(
            ErrorKind::InsufficientFunds,
            format!("insufficient {symbol} at {source}: requested {quantity}, available {available}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Action, PendingSummary};
    use crate::wallet::InMemoryWallet;
    use asl_registry::InMemoryRegistry;
    use asl_store::{InMemoryBalanceStore, Origin};
    use asl_types::{AccountName, Address, DecimalNumber, Symbol};

    fn gold() -> Symbol {
        Symbol::new("GOLD").unwrap()
    }

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn burn(quantity: u64) -> Intent {
        Intent::new(
            AccountName::new("alice").unwrap(),
            Action::Burn {
                owner: addr("Malice"),
                symbol: gold(),
                quantity: Quantity::new(quantity),
            },
        )
    }

    fn store() -> InMemoryBalanceStore {
        let mut store = InMemoryBalanceStore::new();
        store
            .insert_issue(Origin::new(1, 0), addr("Malice"), gold(), Quantity::new(100), DecimalNumber::ZERO)
            .unwrap();
        store
    }

    fn decide(intent: &Intent, store: &InMemoryBalanceStore, pending: &PendingSummary, below: u64) -> StageDecision {
        let registry = InMemoryRegistry::new();
        let wallet = InMemoryWallet::new();
        let context = GateContext::new(&registry, store, &wallet, pending, below);
        FundsStage.evaluate(intent, &context).unwrap()
    }

    #[test]
    fn covered_request_passes() {
        let decision = decide(&burn(100), &store(), &PendingSummary::new(), 2);
        assert!(decision.is_pass());
    }

    #[test]
    fn pending_debits_reduce_available() {
        let pending = PendingSummary::from_actions([&burn(60).action]);
        let decision = decide(&burn(50), &store(), &pending, 2);
        assert!(matches!(decision, StageDecision::Fail { kind: ErrorKind::InsufficientFunds, .. }));
    }

    #[test]
    fn unconfirmed_outputs_give_unknown_input() {
        // Entry at height 1 is not spendable below height 1.
        let decision = decide(&burn(10), &store(), &PendingSummary::new(), 1);
        assert!(matches!(decision, StageDecision::Fail { kind: ErrorKind::UnknownInput, .. }));
    }

    #[test]
    fn pending_credits_give_unknown_input() {
        let incoming = Action::Send {
            from: addr("Mbob"),
            to: addr("Malice"),
            symbol: gold(),
            quantity: Quantity::new(50),
        };
        let pending = PendingSummary::from_actions([&incoming]);
        let decision = decide(&burn(120), &store(), &pending, 2);
        assert!(matches!(decision, StageDecision::Fail { kind: ErrorKind::UnknownInput, .. }));

        let decision = decide(&burn(151), &store(), &pending, 2);
        assert!(matches!(decision, StageDecision::Fail { kind: ErrorKind::InsufficientFunds, .. }));
    }
}
