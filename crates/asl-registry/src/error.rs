use asl_types::{AccountName, ErrorKind, Quantity, Symbol};

use crate::cert::CertKind;

/// Errors produced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("asset symbol '{0}' already exists")]
    DuplicateSymbol(Symbol),

    #[error("asset '{0}' not found")]
    NotFound(Symbol),

    #[error("account '{caller}' is not the issuer of asset '{symbol}'")]
    NotOwner { symbol: Symbol, caller: AccountName },

    #[error("asset '{0}' has already been issued")]
    AlreadyIssued(Symbol),

    #[error("asset '{0}' cannot be issued with zero quantity")]
    ZeroQuantity(Symbol),

    #[error("description exceeds {max} bytes")]
    DescriptionTooLong { max: usize },

    #[error("burn of {requested} exceeds circulating supply {available} of '{symbol}'")]
    SupplyExceeded {
        symbol: Symbol,
        requested: Quantity,
        available: Quantity,
    },

    #[error("cert symbol '{0}' must have a DOMAIN.NAME shape")]
    UndottedCertSymbol(Symbol),

    #[error("{0} certs cannot be issued directly")]
    UnissuableCert(CertKind),

    #[error("{kind} cert '{symbol}' already exists")]
    CertExists { symbol: Symbol, kind: CertKind },

    #[error("account '{caller}' does not hold the {kind} cert '{cert}' needed for '{symbol}'")]
    CertRequired {
        symbol: Symbol,
        cert: Symbol,
        kind: CertKind,
        caller: AccountName,
    },
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateSymbol(_) => ErrorKind::DuplicateSymbol,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotOwner { .. } => ErrorKind::NotOwner,
            Self::AlreadyIssued(_) => ErrorKind::AlreadyIssued,
            Self::ZeroQuantity(_) | Self::DescriptionTooLong { .. } => ErrorKind::InvalidArgument,
            Self::SupplyExceeded { .. } => ErrorKind::InsufficientFunds,
            Self::UndottedCertSymbol(_) | Self::UnissuableCert(_) => ErrorKind::InvalidArgument,
            Self::CertExists { .. } => ErrorKind::AlreadyIssued,
            Self::CertRequired { .. } => ErrorKind::NotOwner,
        }
    }
}
