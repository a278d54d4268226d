use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use asl_registry::{Asset, AssetFilter, AssetReader, AssetStatus};
use asl_store::{BalanceEntry, BalanceReader};
use asl_types::{AccountName, Address, DecimalNumber, EntryId, Quantity, Symbol};

/// One row of an asset listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetView {
    pub symbol: Symbol,
    pub issuer: AccountName,
    /// Holding address; empty for an unissued asset.
    pub address: String,
    /// Raw units.
    pub quantity: Quantity,
    pub decimal_number: DecimalNumber,
    pub status: AssetStatus,
    pub description: String,
}

impl AssetView {
    fn unissued(asset: &Asset) -> Self {
        Self {
            symbol: asset.symbol.clone(),
            issuer: asset.issuer.clone(),
            address: String::new(),
            quantity: Quantity::ZERO,
            decimal_number: asset.decimal_number,
            status: AssetStatus::Unissued,
            description: asset.description.clone(),
        }
    }

    fn held(asset: &Asset, address: &Address, quantity: Quantity) -> Self {
        Self {
            symbol: asset.symbol.clone(),
            issuer: asset.issuer.clone(),
            address: address.to_string(),
            quantity,
            decimal_number: asset.decimal_number,
            status: AssetStatus::Unspent,
            description: asset.description.clone(),
        }
    }

    /// Quantity rendered with the asset's precision, e.g. `"100.50"`.
    pub fn display_quantity(&self) -> String {
        self.quantity.display(self.decimal_number)
    }
}

/// Read-only views over confirmed registry and balance state.
pub struct AssetQuery<'a> {
    registry: &'a dyn AssetReader,
    balances: &'a dyn BalanceReader,
}

impl<'a> AssetQuery<'a> {
    pub fn new(registry: &'a dyn AssetReader, balances: &'a dyn BalanceReader) -> Self {
        Self { registry, balances }
    }

    /// Assets visible to an account.
    ///
    /// Unissued assets the account created come first, in symbol order.
    /// Held assets follow, one row per symbol aggregated across
    /// `addresses`, reported at the address of the oldest live entry.
    pub fn account_assets(
        &self,
        account: &AccountName,
        addresses: &[Address],
        filter: &AssetFilter,
    ) -> Vec<AssetView> {
        let mut rows: Vec<AssetView> = self
            .registry
            .assets(filter)
            .iter()
            .filter(|asset| &asset.issuer == account && !asset.is_issued())
            .map(AssetView::unissued)
            .collect();

        let mut held: BTreeMap<Symbol, (EntryId, Address, Quantity)> = BTreeMap::new();
        for entry in self.balances.entries_for_addresses(addresses) {
            let slot = held
                .entry(entry.symbol.clone())
                .or_insert((entry.id, entry.address.clone(), Quantity::ZERO));
            // Entries arrive in creation order, so the first one seen is the oldest.
            slot.2 = Quantity::new(slot.2.raw().saturating_add(entry.quantity.raw()));
        }

        for (symbol, (_, address, quantity)) in held {
            let Some(asset) = self.registry.get(&symbol) else {
                continue;
            };
            if filter.matches_asset(asset) {
                rows.push(AssetView::held(asset, &address, quantity));
            }
        }
        rows
    }

    /// Raw live entries at one address, in creation order.
    pub fn address_assets(&self, address: &Address, filter: &AssetFilter) -> Vec<AssetView> {
        self.balances
            .entries_for_address(address)
            .iter()
            .filter_map(|entry| self.entry_view(entry, filter))
            .collect()
    }

    /// Registry records, one per asset: supply at the issuing address.
    pub fn asset_records(&self, filter: &AssetFilter) -> Vec<AssetView> {
        self.registry
            .assets(filter)
            .iter()
            .map(|asset| AssetView {
                symbol: asset.symbol.clone(),
                issuer: asset.issuer.clone(),
                address: asset
                    .issued_address()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                quantity: asset.total_supply(),
                decimal_number: asset.decimal_number,
                status: asset.status(),
                description: asset.description.clone(),
            })
            .collect()
    }

    fn entry_view(&self, entry: &BalanceEntry, filter: &AssetFilter) -> Option<AssetView> {
        let asset = self.registry.get(&entry.symbol)?;
        filter
            .matches_asset(asset)
            .then(|| AssetView::held(asset, &entry.address, entry.quantity))
    }
}
