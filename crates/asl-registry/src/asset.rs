use std::fmt;

use serde::{Deserialize, Serialize};

use asl_types::{AccountName, Address, DecimalNumber, Height, Quantity, Symbol};

/// Registration-order identifier of an asset definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Lifecycle status reported for an asset or a holding of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// Defined but never issued; no supply exists.
    Unissued,
    /// Issued and live.
    Unspent,
    /// Issued, and the entire supply has been burned.
    Spent,
    /// Issued, and part of the supply has been burned.
    Mixed,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unissued => "unissued",
            Self::Unspent => "unspent",
            Self::Spent => "spent",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of the single issuance of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuance {
    /// Address that received the full minted quantity.
    pub address: Address,
    /// Raw quantity minted. Never changes after issuance.
    pub supply: Quantity,
    /// Height of the confirmation that committed the issuance.
    pub height: Height,
}

/// An asset definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub symbol: Symbol,
    pub issuer: AccountName,
    pub decimal_number: DecimalNumber,
    pub description: String,
    /// `None` while the asset is unissued.
    pub issuance: Option<Issuance>,
    /// Running total of burned raw units.
    pub burned: Quantity,
}

impl Asset {
    pub fn is_issued(&self) -> bool {
        self.issuance.is_some()
    }

    pub fn issued_address(&self) -> Option<&Address> {
        self.issuance.as_ref().map(|i| &i.address)
    }

    /// Quantity minted by the issuance (zero while unissued).
    pub fn issued_supply(&self) -> Quantity {
        self.issuance
            .as_ref()
            .map(|i| i.supply)
            .unwrap_or(Quantity::ZERO)
    }

    /// Circulating supply: issued minus burned.
    pub fn total_supply(&self) -> Quantity {
        self.issued_supply().saturating_sub(self.burned)
    }

    pub fn status(&self) -> AssetStatus {
        if !self.is_issued() {
            AssetStatus::Unissued
        } else if self.burned.is_zero() {
            AssetStatus::Unspent
        } else if self.total_supply().is_zero() {
            AssetStatus::Spent
        } else {
            AssetStatus::Mixed
        }
    }
}

/// Typed predicate for asset queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum AssetFilter {
    #[default]
    All,
    Symbol(Symbol),
    Issuer(AccountName),
}

impl AssetFilter {
    pub fn matches(&self, symbol: &Symbol, issuer: &AccountName) -> bool {
        match self {
            Self::All => true,
            Self::Symbol(wanted) => wanted == symbol,
            Self::Issuer(wanted) => wanted == issuer,
        }
    }

    pub fn matches_asset(&self, asset: &Asset) -> bool {
        self.matches(&asset.symbol, &asset.issuer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> Asset {
        Asset {
            id: AssetId(0),
            symbol: Symbol::new("GOLD").unwrap(),
            issuer: AccountName::new("alice").unwrap(),
            decimal_number: DecimalNumber::ZERO,
            description: String::new(),
            issuance: None,
            burned: Quantity::ZERO,
        }
    }

    fn issued(supply: u64, burned: u64) -> Asset {
        Asset {
            issuance: Some(Issuance {
                address: Address::new("Mabc").unwrap(),
                supply: Quantity::new(supply),
                height: 1,
            }),
            burned: Quantity::new(burned),
            ..asset()
        }
    }

    #[test]
    fn status_follows_supply() {
        assert_eq!(asset().status(), AssetStatus::Unissued);
        assert_eq!(issued(100, 0).status(), AssetStatus::Unspent);
        assert_eq!(issued(100, 40).status(), AssetStatus::Mixed);
        assert_eq!(issued(100, 100).status(), AssetStatus::Spent);
    }

    #[test]
    fn total_supply_subtracts_burns() {
        assert_eq!(asset().total_supply(), Quantity::ZERO);
        assert_eq!(issued(100, 40).total_supply(), Quantity::new(60));
        assert_eq!(issued(100, 40).issued_supply(), Quantity::new(100));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AssetStatus::Unissued).unwrap(),
            "\"unissued\""
        );
    }

    #[test]
    fn filter_matches_by_symbol_and_issuer() {
        let a = asset();
        assert!(AssetFilter::All.matches_asset(&a));
        assert!(AssetFilter::Symbol(Symbol::new("GOLD").unwrap()).matches_asset(&a));
        assert!(!AssetFilter::Symbol(Symbol::new("SILVER").unwrap()).matches_asset(&a));
        assert!(AssetFilter::Issuer(AccountName::new("alice").unwrap()).matches_asset(&a));
        assert!(!AssetFilter::Issuer(AccountName::new("bob").unwrap()).matches_asset(&a));
    }
}
