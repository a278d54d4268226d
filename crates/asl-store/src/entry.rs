use serde::{Deserialize, Serialize};

use asl_types::{Address, DecimalNumber, EntryId, Height, Quantity, Symbol};

/// An unspent quantity of an asset held at an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub id: EntryId,
    pub address: Address,
    pub symbol: Symbol,
    /// Raw units, scaled by `10^decimal_number`. Always non-zero.
    pub quantity: Quantity,
    /// Precision copied from the asset at issuance.
    pub decimal_number: DecimalNumber,
    /// Height at which the value in this entry was first confirmed.
    ///
    /// Equal to the entry's own height, except for change: change returns
    /// already-confirmed value to its owner and keeps the oldest height of
    /// the inputs it came from, so it stays spendable within its batch.
    pub funded_at: Height,
}

impl BalanceEntry {
    /// Height of the confirmation that produced this entry.
    pub fn height(&self) -> Height {
        self.id.height
    }

    /// Whether the entry may be consumed by an intent confirmed at `height`.
    pub fn is_spendable_below(&self, height: Height) -> bool {
        self.funded_at < height
    }
}

/// Position of the intent that produces new entries.
///
/// Outputs are numbered `0..` within the origin; only entries confirmed
/// strictly below `height` may be consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub height: Height,
    pub index: u32,
}

impl Origin {
    pub const fn new(height: Height, index: u32) -> Self {
        Self { height, index }
    }

    pub const fn output(self, output: u32) -> EntryId {
        EntryId::new(self.height, self.index, output)
    }
}

/// Entries consumed and produced by a transfer or burn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub consumed: Vec<BalanceEntry>,
    pub produced: Vec<BalanceEntry>,
}

impl SpendReceipt {
    pub fn consumed_total(&self) -> Quantity {
        Quantity::new(self.consumed.iter().map(|e| e.quantity.raw()).sum())
    }

    pub fn produced_total(&self) -> Quantity {
        Quantity::new(self.produced.iter().map(|e| e.quantity.raw()).sum())
    }
}
