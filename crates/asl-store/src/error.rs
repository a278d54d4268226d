use asl_types::{Address, EntryId, ErrorKind, Quantity, Symbol};

/// Errors from balance store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The source holds less than requested, counting every entry.
    #[error("insufficient {symbol} at {address}: requested {requested}, available {available}")]
    InsufficientFunds {
        address: Address,
        symbol: Symbol,
        requested: Quantity,
        available: Quantity,
    },

    /// The source would have enough only by spending unconfirmed outputs.
    #[error("{symbol} at {address} depends on unconfirmed outputs: requested {requested}, confirmed {confirmed}")]
    UnknownInput {
        address: Address,
        symbol: Symbol,
        requested: Quantity,
        confirmed: Quantity,
    },

    /// Zero-quantity entries and operations are never allowed.
    #[error("quantity must be greater than zero")]
    ZeroQuantity,

    /// An entry with this id already exists.
    #[error("entry {0} already exists")]
    DuplicateEntry(EntryId),

    /// Arithmetic on quantities overflowed.
    #[error("quantity overflow for {0}")]
    Overflow(Symbol),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::UnknownInput { .. } => ErrorKind::UnknownInput,
            Self::ZeroQuantity => ErrorKind::InvalidArgument,
            Self::DuplicateEntry(_) | Self::Overflow(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
