use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use asl_types::{AccountName, Address, DecimalNumber, IntentId, Quantity, Symbol};

/// The kind of operation an intent requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Create,
    Issue,
    Send,
    SendFrom,
    Burn,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Issue => "issue",
            Self::Send => "send",
            Self::SendFrom => "send_from",
            Self::Burn => "burn",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a requested operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Register a new, unissued asset owned by the actor.
    Create {
        symbol: Symbol,
        decimal_number: DecimalNumber,
        description: String,
    },
    /// Mint the full supply of the actor's asset to `to`.
    Issue {
        symbol: Symbol,
        to: Address,
        quantity: Quantity,
    },
    /// Move funds from one of the actor's own addresses.
    Send {
        from: Address,
        to: Address,
        symbol: Symbol,
        quantity: Quantity,
    },
    /// Move funds from an address the actor holds a spend capability for.
    SendFrom {
        from: Address,
        to: Address,
        symbol: Symbol,
        quantity: Quantity,
    },
    /// Irreversibly destroy funds held at one of the actor's addresses.
    Burn {
        owner: Address,
        symbol: Symbol,
        quantity: Quantity,
    },
}

impl Action {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Create { .. } => IntentKind::Create,
            Self::Issue { .. } => IntentKind::Issue,
            Self::Send { .. } => IntentKind::Send,
            Self::SendFrom { .. } => IntentKind::SendFrom,
            Self::Burn { .. } => IntentKind::Burn,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Create { symbol, .. }
            | Self::Issue { symbol, .. }
            | Self::Send { symbol, .. }
            | Self::SendFrom { symbol, .. }
            | Self::Burn { symbol, .. } => symbol,
        }
    }

    /// The quantity moved, minted or destroyed (`None` for creation).
    pub fn quantity(&self) -> Option<Quantity> {
        match self {
            Self::Create { .. } => None,
            Self::Issue { quantity, .. }
            | Self::Send { quantity, .. }
            | Self::SendFrom { quantity, .. }
            | Self::Burn { quantity, .. } => Some(*quantity),
        }
    }

    /// The address funds are taken from, for spending actions.
    pub fn source(&self) -> Option<&Address> {
        match self {
            Self::Send { from, .. } | Self::SendFrom { from, .. } => Some(from),
            Self::Burn { owner, .. } => Some(owner),
            Self::Create { .. } | Self::Issue { .. } => None,
        }
    }

    /// The address that receives a new entry, if any.
    pub fn destination(&self) -> Option<&Address> {
        match self {
            Self::Issue { to, .. } | Self::Send { to, .. } | Self::SendFrom { to, .. } => Some(to),
            Self::Create { .. } | Self::Burn { .. } => None,
        }
    }

    /// Whether the action waits for a confirmation before it takes effect.
    pub fn is_chain_action(&self) -> bool {
        !matches!(self, Self::Create { .. })
    }
}

/// An operation submitted by an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub actor: AccountName,
    pub action: Action,
}

impl Intent {
    pub fn new(actor: AccountName, action: Action) -> Self {
        Self {
            id: IntentId::new(),
            actor,
            action,
        }
    }

    pub fn kind(&self) -> IntentKind {
        self.action.kind()
    }
}

/// Effects of intents accepted but not yet confirmed.
///
/// Validation subtracts pending debits from confirmed balances so two
/// intents in one confirmation window can never spend the same funds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingSummary {
    issues: BTreeSet<Symbol>,
    debits: BTreeMap<(Address, Symbol), Quantity>,
    credits: BTreeMap<(Address, Symbol), Quantity>,
}

impl PendingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions<'a, I: IntoIterator<Item = &'a Action>>(actions: I) -> Self {
        let mut summary = Self::new();
        for action in actions {
            summary.record(action);
        }
        summary
    }

    pub fn record(&mut self, action: &Action) {
        match action {
            Action::Create { .. } => {}
            Action::Issue {
                symbol,
                to,
                quantity,
            } => {
                self.issues.insert(symbol.clone());
                add(&mut self.credits, to, symbol, *quantity);
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
                add(&mut self.debits, from, symbol, *quantity);
                add(&mut self.credits, to, symbol, *quantity);
            }
            Action::Burn {
                owner,
                symbol,
                quantity,
            } => {
                add(&mut self.debits, owner, symbol, *quantity);
            }
        }
    }

    pub fn is_issue_pending(&self, symbol: &Symbol) -> bool {
        self.issues.contains(symbol)
    }

    pub fn debit(&self, address: &Address, symbol: &Symbol) -> Quantity {
        lookup(&self.debits, address, symbol)
    }

    pub fn credit(&self, address: &Address, symbol: &Symbol) -> Quantity {
        lookup(&self.credits, address, symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.debits.is_empty() && self.credits.is_empty()
    }
}

fn add(
    map: &mut BTreeMap<(Address, Symbol), Quantity>,
    address: &Address,
    symbol: &Symbol,
    quantity: Quantity,
) {
    let slot = map
        .entry((address.clone(), symbol.clone()))
        .or_insert(Quantity::ZERO);
    *slot = Quantity::new(slot.raw().saturating_add(quantity.raw()));
}

fn lookup(
    map: &BTreeMap<(Address, Symbol), Quantity>,
    address: &Address,
    symbol: &Symbol,
) -> Quantity {
    map.get(&(address.clone(), symbol.clone()))
        .copied()
        .unwrap_or(Quantity::ZERO)
}
