//! Asset registry for the asset ledger (ASL).
//!
//! The registry owns every asset definition, keyed by its globally unique
//! [`Symbol`](asl_types::Symbol). It enforces the two rules that protect
//! supply:
//!
//! 1. A symbol is registered at most once, issued or not.
//! 2. An asset is issued at most once. Issuance is the only event that
//!    creates supply; burning is the only event that destroys it.
//!
//! Dotted symbols (`DOMAIN.NAME`) are additionally governed by asset
//! certs: issuing the first asset of a domain grants a [`CertKind::Domain`]
//! cert, and only its holder may hand out [`CertKind::DomainNaming`] certs
//! for names under it.
//!
//! Reads go through the [`AssetReader`] trait so the validator can check
//! intents against any registry view.

pub mod asset;
pub mod cert;
pub mod error;
pub mod registry;

pub use asset::{Asset, AssetFilter, AssetId, AssetStatus, Issuance};
pub use cert::{AssetCert, CertKind};
pub use error::RegistryError;
pub use registry::{AssetReader, InMemoryRegistry};
