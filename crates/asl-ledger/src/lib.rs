//! Asset ledger core (ASL).
//!
//! This crate ties the registry, balance store, and gate together into a
//! confirmation-driven ledger. It provides:
//! - [`AssetLedger`]: validated submission, the pending queue, and `confirm()`
//! - [`Block`]s linked into a BLAKE3 hash chain, checked by [`ChainValidator`]
//! - Deterministic replay from genesis or from a [`LedgerSnapshot`]
//! - Account, address, and registry views through [`AssetQuery`]
//! - [`AssetService`], a named-call surface returning coded [`Response`]s

pub mod block;
pub mod config;
pub mod error;
pub mod ledger;
pub mod query;
pub mod replay;
pub mod service;
pub mod state;
pub mod validation;

pub use block::{Block, CommittedIntent, LocalOp, RejectedIntent, GENESIS_HASH};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::{AssetLedger, PendingIntent};
pub use query::{AssetQuery, AssetView};
pub use replay::{ReplayEngine, ReplayResult};
pub use service::{Amount, AssetService, Call, Response};
pub use state::LedgerSnapshot;
pub use validation::{ChainReport, ChainValidator, Violation, ViolationKind};
