use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use asl_types::{AccountName, Address};

/// Boundary to the wallet layer: address ownership and spend authority.
///
/// Key custody and signing live outside the ledger. The ledger only asks
/// which addresses an account controls and whether an account may move
/// funds out of a given address.
pub trait Wallet: Send + Sync {
    /// Addresses of an account, main address first.
    fn addresses(&self, account: &AccountName) -> Vec<Address>;

    fn owner_of(&self, address: &Address) -> Option<AccountName>;

    /// Whether `account` may spend funds held at `address` through a
    /// delegated transfer.
    fn can_spend_from(&self, account: &AccountName, address: &Address) -> bool;

    fn main_address(&self, account: &AccountName) -> Option<Address> {
        self.addresses(account).into_iter().next()
    }

    fn owns(&self, account: &AccountName, address: &Address) -> bool {
        self.owner_of(address).as_ref() == Some(account)
    }
}

#[derive(Default)]
struct WalletState {
    accounts: BTreeMap<AccountName, Vec<Address>>,
    owners: HashMap<Address, AccountName>,
    grants: BTreeSet<(AccountName, Address)>,
}

/// Deterministic in-memory wallet for tests and embedding.
///
/// Addresses are derived with [`Address::derive`], so the same account
/// always gets the same address sequence. Owners may always spend from
/// their addresses; other accounts need an explicit grant.
#[derive(Default)]
pub struct InMemoryWallet {
    inner: RwLock<WalletState>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account (idempotent) and return its main address.
    pub fn create_account(&self, account: &AccountName) -> Address {
        if let Some(main) = self.main_address(account) {
            return main;
        }
        self.new_address(account)
    }

    /// Derive and register the next address of `account`.
    pub fn new_address(&self, account: &AccountName) -> Address {
        let mut state = self.write();
        let index = state.accounts.get(account).map(Vec::len).unwrap_or(0) as u32;
        let address = Address::derive(account, index);
        state
            .accounts
            .entry(account.clone())
            .or_default()
            .push(address.clone());
        state.owners.insert(address.clone(), account.clone());
        address
    }

    /// Allow `delegate` to move funds out of `address`.
    pub fn grant_spend(&self, delegate: &AccountName, address: &Address) {
        self.write()
            .grants
            .insert((delegate.clone(), address.clone()));
    }

    pub fn revoke_spend(&self, delegate: &AccountName, address: &Address) -> bool {
        self.write()
            .grants
            .remove(&(delegate.clone(), address.clone()))
    }

    pub fn accounts(&self) -> Vec<AccountName> {
        self.read().accounts.keys().cloned().collect()
    }

    // The wallet holds no invariants that a panicking writer could break
    // halfway, so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, WalletState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, WalletState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Wallet for InMemoryWallet {
    fn addresses(&self, account: &AccountName) -> Vec<Address> {
        self.read()
            .accounts
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    fn owner_of(&self, address: &Address) -> Option<AccountName> {
        self.read().owners.get(address).cloned()
    }

    fn can_spend_from(&self, account: &AccountName, address: &Address) -> bool {
        let state = self.read();
        state.owners.get(address) == Some(account)
            || state.grants.contains(&(account.clone(), address.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    #[test]
    fn create_account_is_idempotent() {
        let wallet = InMemoryWallet::new();
        let first = wallet.create_account(&acct("alice"));
        let second = wallet.create_account(&acct("alice"));
        assert_eq!(first, second);
        assert_eq!(wallet.addresses(&acct("alice")).len(), 1);
        assert_eq!(first, Address::derive(&acct("alice"), 0));
    }

    #[test]
    fn main_address_is_first() {
        let wallet = InMemoryWallet::new();
        let main = wallet.create_account(&acct("alice"));
        let second = wallet.new_address(&acct("alice"));
        assert_ne!(main, second);
        assert_eq!(wallet.main_address(&acct("alice")), Some(main));
        assert_eq!(wallet.addresses(&acct("alice")).len(), 2);
    }

    #[test]
    fn ownership_and_grants() {
        let wallet = InMemoryWallet::new();
        let alice_addr = wallet.create_account(&acct("alice"));
        wallet.create_account(&acct("bob"));

        assert!(wallet.owns(&acct("alice"), &alice_addr));
        assert!(!wallet.owns(&acct("bob"), &alice_addr));
        assert!(wallet.can_spend_from(&acct("alice"), &alice_addr));
        assert!(!wallet.can_spend_from(&acct("bob"), &alice_addr));

        wallet.grant_spend(&acct("bob"), &alice_addr);
        assert!(wallet.can_spend_from(&acct("bob"), &alice_addr));
        assert!(wallet.revoke_spend(&acct("bob"), &alice_addr));
        assert!(!wallet.can_spend_from(&acct("bob"), &alice_addr));
    }

    #[test]
    fn unknown_account_has_no_addresses() {
        let wallet = InMemoryWallet::new();
        assert!(wallet.addresses(&acct("ghost")).is_empty());
        assert_eq!(wallet.main_address(&acct("ghost")), None);
    }
}
