use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use asl_types::{Address, DecimalNumber, EntryId, Height, Quantity, Symbol};

use crate::entry::{BalanceEntry, Origin, SpendReceipt};
use crate::error::{StoreError, StoreResult};
use crate::traits::BalanceReader;

/// Map-backed balance store.
///
/// Entries are kept in a `BTreeMap` keyed by [`EntryId`] with a per-address
/// index. The store is plain data: the owning ledger serializes mutation,
/// and snapshots serialize it as an ordered list of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<BalanceEntry>", into = "Vec<BalanceEntry>")]
pub struct InMemoryBalanceStore {
    entries: BTreeMap<EntryId, BalanceEntry>,
    by_address: BTreeMap<Address, BTreeSet<EntryId>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every live entry in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.values()
    }

    /// Record the issuance output: the full supply at one address.
    pub fn insert_issue(
        &mut self,
        origin: Origin,
        address: Address,
        symbol: Symbol,
        quantity: Quantity,
        decimal_number: DecimalNumber,
    ) -> StoreResult<BalanceEntry> {
        if quantity.is_zero() {
            return Err(StoreError::ZeroQuantity);
        }
        let entry = BalanceEntry {
            id: origin.output(0),
            address,
            symbol,
            quantity,
            decimal_number,
            funded_at: origin.height,
        };
        if self.entries.contains_key(&entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        debug!(id = %entry.id, address = %entry.address, symbol = %entry.symbol, %quantity, "issue output recorded");
        self.insert(entry.clone());
        Ok(entry)
    }

    /// Move `quantity` of `symbol` from `from` to `to`.
    ///
    /// Output `0` is the recipient entry; output `1`, present only when the
    /// selected inputs exceed `quantity`, is the change back at `from`.
    pub fn apply_transfer(
        &mut self,
        origin: Origin,
        from: &Address,
        to: &Address,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> StoreResult<SpendReceipt> {
        let (inputs, total) = self.select_inputs(origin, from, symbol, quantity)?;
        let decimal_number = inputs[0].decimal_number;
        let funded_at = inputs_funded_at(&inputs);

        let mut produced = vec![BalanceEntry {
            id: origin.output(0),
            address: to.clone(),
            symbol: symbol.clone(),
            quantity,
            decimal_number,
            funded_at: origin.height,
        }];
        let change = change_entry(
            origin.output(1),
            from,
            symbol,
            total,
            quantity,
            decimal_number,
            funded_at,
        );
        produced.extend(change);

        let receipt = self.commit(inputs, produced)?;
        debug!(%from, %to, %symbol, %quantity, consumed = receipt.consumed.len(), "transfer applied");
        Ok(receipt)
    }

    /// Destroy `quantity` of `symbol` held at `owner`.
    ///
    /// Only a change entry (output `0`) is produced. Burning the entire
    /// balance leaves no entry behind.
    pub fn apply_burn(
        &mut self,
        origin: Origin,
        owner: &Address,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> StoreResult<SpendReceipt> {
        let (inputs, total) = self.select_inputs(origin, owner, symbol, quantity)?;
        let decimal_number = inputs[0].decimal_number;
        let funded_at = inputs_funded_at(&inputs);

        let produced = change_entry(
            origin.output(0),
            owner,
            symbol,
            total,
            quantity,
            decimal_number,
            funded_at,
        )
        .into_iter()
        .collect();

        let receipt = self.commit(inputs, produced)?;
        debug!(%owner, %symbol, %quantity, consumed = receipt.consumed.len(), "burn applied");
        Ok(receipt)
    }

    /// Pick inputs smallest-first until they cover `quantity`.
    ///
    /// Only entries spendable below `origin.height` are candidates, which
    /// includes change produced earlier in the same batch. Returns
    /// the selected entries and their sum.
    fn select_inputs(
        &self,
        origin: Origin,
        address: &Address,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> StoreResult<(Vec<BalanceEntry>, Quantity)> {
        if quantity.is_zero() {
            return Err(StoreError::ZeroQuantity);
        }

        let all = self.entries_for(address, symbol);
        let mut spendable: Vec<BalanceEntry> = all
            .iter()
            .filter(|e| e.is_spendable_below(origin.height))
            .cloned()
            .collect();
        spendable.sort_by_key(|e| (e.quantity, e.id));

        let mut selected = Vec::new();
        let mut total = Quantity::ZERO;
        for entry in spendable {
            if total >= quantity {
                break;
            }
            total = total
                .checked_add(entry.quantity)
                .ok_or_else(|| StoreError::Overflow(symbol.clone()))?;
            selected.push(entry);
        }

        if total < quantity {
            let available = Quantity::checked_sum(all.iter().map(|e| e.quantity))
                .ok_or_else(|| StoreError::Overflow(symbol.clone()))?;
            if available >= quantity {
                return Err(StoreError::UnknownInput {
                    address: address.clone(),
                    symbol: symbol.clone(),
                    requested: quantity,
                    confirmed: total,
                });
            }
            return Err(StoreError::InsufficientFunds {
                address: address.clone(),
                symbol: symbol.clone(),
                requested: quantity,
                available,
            });
        }

        Ok((selected, total))
    }

    /// Remove `inputs` and insert `produced` as one step.
    fn commit(
        &mut self,
        inputs: Vec<BalanceEntry>,
        produced: Vec<BalanceEntry>,
    ) -> StoreResult<SpendReceipt> {
        if let Some(clash) = produced.iter().find(|e| self.entries.contains_key(&e.id)) {
            return Err(StoreError::DuplicateEntry(clash.id));
        }
        for input in &inputs {
            self.remove(&input.id);
        }
        for output in &produced {
            self.insert(output.clone());
        }
        Ok(SpendReceipt {
            consumed: inputs,
            produced,
        })
    }

    fn insert(&mut self, entry: BalanceEntry) {
        self.by_address
            .entry(entry.address.clone())
            .or_default()
            .insert(entry.id);
        self.entries.insert(entry.id, entry);
    }

    fn remove(&mut self, id: &EntryId) -> Option<BalanceEntry> {
        let entry = self.entries.remove(id)?;
        if let Some(ids) = self.by_address.get_mut(&entry.address) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_address.remove(&entry.address);
            }
        }
        Some(entry)
    }
}

fn inputs_funded_at(inputs: &[BalanceEntry]) -> Height {
    inputs.iter().map(|e| e.funded_at).max().unwrap_or_default()
}

fn change_entry(
    id: EntryId,
    owner: &Address,
    symbol: &Symbol,
    total: Quantity,
    spent: Quantity,
    decimal_number: DecimalNumber,
    funded_at: Height,
) -> Option<BalanceEntry> {
    let change = total.checked_sub(spent).filter(|c| !c.is_zero())?;
    Some(BalanceEntry {
        id,
        address: owner.clone(),
        symbol: symbol.clone(),
        quantity: change,
        decimal_number,
        funded_at,
    })
}

impl BalanceReader for InMemoryBalanceStore {
    fn entry(&self, id: &EntryId) -> Option<&BalanceEntry> {
        self.entries.get(id)
    }

    fn entries_for_address(&self, address: &Address) -> Vec<BalanceEntry> {
        self.by_address
            .get(address)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.entries.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn entries_for(&self, address: &Address, symbol: &Symbol) -> Vec<BalanceEntry> {
        self.entries_for_address(address)
            .into_iter()
            .filter(|e| &e.symbol == symbol)
            .collect()
    }

    fn entries_for_symbol(&self, symbol: &Symbol) -> Vec<BalanceEntry> {
        self.entries
            .values()
            .filter(|e| &e.symbol == symbol)
            .cloned()
            .collect()
    }
}

impl From<Vec<BalanceEntry>> for InMemoryBalanceStore {
    fn from(entries: Vec<BalanceEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }
}

impl From<InMemoryBalanceStore> for Vec<BalanceEntry> {
    fn from(store: InMemoryBalanceStore) -> Self {
        store.entries.into_values().collect()
    }
}
