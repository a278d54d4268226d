use serde::{Deserialize, Serialize};
use tracing::debug;

use asl_gate::{Action, Intent};
use asl_registry::{AssetReader, InMemoryRegistry, RegistryError};
use asl_store::{InMemoryBalanceStore, Origin};
use asl_types::Height;

use crate::block::LocalOp;
use crate::error::LedgerError;

/// Confirmed ledger state: asset definitions, live entries, and height.
///
/// This is also the snapshot format. Two states are equal exactly when
/// their [`to_bytes`](Self::to_bytes) encodings are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub height: Height,
    pub registry: InMemoryRegistry,
    pub store: InMemoryBalanceStore,
}

impl LedgerSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Apply a registry-only operation.
    pub(crate) fn apply_local(&mut self, op: &LocalOp) -> Result<(), LedgerError> {
        match op {
            LocalOp::Created { intent } => match &intent.action {
                Action::Create {
                    symbol,
                    decimal_number,
                    description,
                } => {
                    self.registry.create(
                        symbol.clone(),
                        intent.actor.clone(),
                        *decimal_number,
                        description.clone(),
                    )?;
                }
                other => {
                    return Err(LedgerError::IntegrityViolation {
                        height: self.height,
                        reason: format!("local record holds a {} intent", other.kind()),
                    })
                }
            },
            LocalOp::Deleted { actor, symbol } => {
                self.registry.delete_local(symbol, actor)?;
            }
            LocalOp::CertIssued {
                actor,
                symbol,
                kind,
                owner,
                address,
            } => {
                self.registry
                    .issue_cert(symbol.clone(), actor, *kind, owner.clone(), address.clone())?;
            }
        }
        Ok(())
    }

    /// Apply a chain intent at `origin`.
    ///
    /// Every precondition is checked before anything is mutated, so an
    /// error leaves the state untouched.
    pub(crate) fn apply_intent(&mut self, origin: Origin, intent: &Intent) -> Result<(), LedgerError> {
        match &intent.action {
            Action::Create { .. } => {
                return Err(LedgerError::IntegrityViolation {
                    height: origin.height,
                    reason: "create intents are applied at submission".into(),
                })
            }
            Action::Issue {
                symbol,
                to,
                quantity,
            } => {
                let decimal_number = self.registry.check_issue(symbol, &intent.actor)?.decimal_number;
                if quantity.is_zero() {
                    return Err(RegistryError::ZeroQuantity(symbol.clone()).into());
                }
                self.store
                    .insert_issue(origin, to.clone(), symbol.clone(), *quantity, decimal_number)?;
                self.registry
                    .issue(symbol, &intent.actor, to.clone(), *quantity, origin.height)?;
            }
            Action::Send {
                from,
                to,
                symbol,
                quantity,
            }
            | Action::SendFrom {
                from,
                to,
                symbol,
                quantity,
            } => {
                self.registry.check_issued(symbol)?;
                self.store
                    .apply_transfer(origin, from, to, symbol, *quantity)?;
            }
            Action::Burn {
                owner,
                symbol,
                quantity,
            } => {
                let available = self.registry.check_issued(symbol)?.total_supply();
                if *quantity > available {
                    return Err(RegistryError::SupplyExceeded {
                        symbol: symbol.clone(),
                        requested: *quantity,
                        available,
                    }
                    .into());
                }
                self.store.apply_burn(origin, owner, symbol, *quantity)?;
                self.registry.burn(symbol, *quantity)?;
            }
        }
        debug!(intent = %intent.id, kind = %intent.kind(), height = origin.height, index = origin.index, "intent applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asl_store::BalanceReader;
    use asl_types::{AccountName, Address, DecimalNumber, Quantity, Symbol};

    fn alice() -> AccountName {
        AccountName::new("alice").unwrap()
    }

    fn x() -> Symbol {
        Symbol::new("X").unwrap()
    }

    fn addr() -> Address {
        Address::new("Malice").unwrap()
    }

    fn issued(quantity: u64) -> LedgerSnapshot {
        let mut state = LedgerSnapshot::default();
        state
            .apply_local(&LocalOp::Created {
                intent: Intent::new(
                    alice(),
                    Action::Create {
                        symbol: x(),
                        decimal_number: DecimalNumber::ZERO,
                        description: String::new(),
                    },
                ),
            })
            .unwrap();
        state
            .apply_intent(
                Origin::new(1, 0),
                &Intent::new(
                    alice(),
                    Action::Issue {
                        symbol: x(),
                        to: addr(),
                        quantity: Quantity::new(quantity),
                    },
                ),
            )
            .unwrap();
        state.height = 1;
        state
    }

    fn burn(quantity: u64) -> Intent {
        Intent::new(
            alice(),
            Action::Burn {
                owner: addr(),
                symbol: x(),
                quantity: Quantity::new(quantity),
            },
        )
    }

    #[test]
    fn burn_updates_store_and_registry_together() {
        let mut state = issued(100);
        state.apply_intent(Origin::new(2, 0), &burn(40)).unwrap();
        assert_eq!(state.store.balance(&addr(), &x()), Quantity::new(60));
        assert_eq!(state.registry.lookup(&x()).unwrap().total_supply(), Quantity::new(60));
    }

    #[test]
    fn failed_burn_leaves_state_untouched() {
        let mut state = issued(100);
        let before = state.to_bytes().unwrap();
        let err = state.apply_intent(Origin::new(2, 0), &burn(101)).unwrap_err();
        assert_eq!(err.code(), 5001);
        assert_eq!(state.to_bytes().unwrap(), before);
    }

    #[test]
    fn snapshot_bytes_roundtrip() {
        let state = issued(100);
        let restored = LedgerSnapshot::from_bytes(&state.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn deleting_issued_asset_fails() {
        let mut state = issued(100);
        let err = state
            .apply_local(&LocalOp::Deleted {
                actor: alice(),
                symbol: x(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), asl_types::ErrorKind::AlreadyIssued);
    }
}
