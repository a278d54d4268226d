//! Foundation types for the asset ledger (ASL).
//!
//! This crate provides the identity, quantity, and error types shared by
//! every other ASL crate.
//!
//! # Key Types
//!
//! - [`Symbol`]: Globally unique asset name (case-sensitive)
//! - [`AccountName`]: Wallet account that owns addresses and issues assets
//! - [`Address`]: Holding address for balance entries
//! - [`Quantity`]: Fixed-point raw amount scaled by 10^[`DecimalNumber`]
//! - [`IntentId`]: UUID v7 identifier of a submitted intent
//! - [`EntryId`]: Deterministic identifier of a confirmed balance entry
//! - [`ErrorKind`]: Failure taxonomy with stable numeric codes

pub mod account;
pub mod error;
pub mod ids;
pub mod quantity;
pub mod symbol;

pub use account::{AccountName, Address};
pub use error::{ErrorKind, TypeError};
pub use ids::{EntryId, Height, IntentId};
pub use quantity::{DecimalNumber, Quantity};
pub use symbol::Symbol;
