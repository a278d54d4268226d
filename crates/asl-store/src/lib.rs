//! UTXO-style balance store for the asset ledger (ASL).
//!
//! Every unspent amount of an asset held at an address is an immutable
//! [`BalanceEntry`]. Moving value never edits an entry: inputs are consumed
//! whole and new outputs (recipient and change) are produced.
//!
//! # Design Rules
//!
//! 1. No entry ever has a zero quantity. A fully consumed entry is removed.
//! 2. Inputs are selected smallest-first, ties broken by [`EntryId`](asl_types::EntryId).
//! 3. Entries produced at height `h` are not spendable by operations
//!    applied at height `h`.
//! 4. A failed operation leaves the store untouched.

pub mod entry;
pub mod error;
pub mod memory;
pub mod traits;

pub use entry::{BalanceEntry, Origin, SpendReceipt};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBalanceStore;
pub use traits::BalanceReader;
