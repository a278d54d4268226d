use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A wallet account: a collection of addresses controlled by one user.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::EmptyAccount);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}

impl FromStr for AccountName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self.0)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A holding address for balance entries.
///
/// The ledger does not interpret address contents beyond a shape check;
/// address generation and key custody belong to the wallet layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Maximum address length in bytes.
    pub const MAX_LEN: usize = 64;

    pub fn new(address: impl Into<String>) -> Result<Self, TypeError> {
        let address = address.into();
        if address.is_empty()
            || address.len() > Self::MAX_LEN
            || !address.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(TypeError::InvalidAddress(address));
        }
        Ok(Self(address))
    }

    /// Derive the `index`-th address of an account.
    ///
    /// The same account and index always produce the same address.
    pub fn derive(account: &AccountName, index: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"asl-address-v1:");
        hasher.update(account.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(&index.to_le_bytes());
        let digest = hasher.finalize();
        Self(format!("M{}", hex::encode(&digest.as_bytes()[..17])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountName {
        AccountName::new("alice").unwrap()
    }

    #[test]
    fn account_name_rejects_blank() {
        assert_eq!(AccountName::new("  "), Err(TypeError::EmptyAccount));
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(Address::derive(&alice(), 0), Address::derive(&alice(), 0));
    }

    #[test]
    fn derive_differs_by_index_and_account() {
        let bob = AccountName::new("bob").unwrap();
        assert_ne!(Address::derive(&alice(), 0), Address::derive(&alice(), 1));
        assert_ne!(Address::derive(&alice(), 0), Address::derive(&bob, 0));
    }

    #[test]
    fn derived_addresses_are_valid() {
        let derived = Address::derive(&alice(), 7);
        assert!(derived.as_str().starts_with('M'));
        assert_eq!(derived.as_str().len(), 35);
        assert_eq!(Address::new(derived.as_str()).unwrap(), derived);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(Address::new("").is_err());
        assert!(Address::new("M-123").is_err());
        assert!(Address::new("M".repeat(65)).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let address = Address::derive(&alice(), 3);
        let json = serde_json::to_string(&address).unwrap();
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, address);
    }
}
