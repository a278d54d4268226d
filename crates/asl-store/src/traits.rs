use asl_types::{Address, EntryId, Height, Quantity, Symbol};

use crate::entry::BalanceEntry;

/// Read boundary for balance entries.
///
/// Implementations keep entries ordered by [`EntryId`] so every listing is
/// deterministic.
pub trait BalanceReader {
    fn entry(&self, id: &EntryId) -> Option<&BalanceEntry>;

    /// Raw live entries held at `address`, in creation order.
    fn entries_for_address(&self, address: &Address) -> Vec<BalanceEntry>;

    /// Raw live entries at `address` for one symbol, in creation order.
    fn entries_for(&self, address: &Address, symbol: &Symbol) -> Vec<BalanceEntry>;

    /// Every live entry of `symbol`, in creation order.
    fn entries_for_symbol(&self, symbol: &Symbol) -> Vec<BalanceEntry>;

    /// Raw live entries across a set of addresses, in creation order.
    fn entries_for_addresses(&self, addresses: &[Address]) -> Vec<BalanceEntry> {
        let mut entries: Vec<BalanceEntry> = addresses
            .iter()
            .flat_map(|address| self.entries_for_address(address))
            .collect();
        entries.sort_by_key(|e| e.id);
        entries.dedup_by_key(|e| e.id);
        entries
    }

    /// Sum of every live entry at `address` for `symbol`.
    fn balance(&self, address: &Address, symbol: &Symbol) -> Quantity {
        Quantity::new(
            self.entries_for(address, symbol)
                .iter()
                .map(|e| e.quantity.raw())
                .sum(),
        )
    }

    /// Sum of the entries at `address` for `symbol` an intent confirmed at
    /// `below` may consume.
    fn spendable_balance(&self, address: &Address, symbol: &Symbol, below: Height) -> Quantity {
        Quantity::new(
            self.entries_for(address, symbol)
                .iter()
                .filter(|e| e.is_spendable_below(below))
                .map(|e| e.quantity.raw())
                .sum(),
        )
    }

    /// Sum of every live entry of `symbol`.
    fn total_for_symbol(&self, symbol: &Symbol) -> Quantity {
        Quantity::new(
            self.entries_for_symbol(symbol)
                .iter()
                .map(|e| e.quantity.raw())
                .sum(),
        )
    }
}
