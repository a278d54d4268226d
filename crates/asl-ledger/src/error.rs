use asl_gate::GateError;
use asl_registry::RegistryError;
use asl_store::StoreError;
use asl_types::{AccountName, ErrorKind, IntentId, TypeError};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The validator rejected the intent.
    #[error("{reason}")]
    Rejected { kind: ErrorKind, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("pending queue is full ({max} intents)")]
    QueueFull { max: usize },

    #[error("pending intent {0} not found")]
    IntentNotFound(IntentId),

    #[error("pending intent {id} belongs to another account than '{caller}'")]
    NotIntentOwner { id: IntentId, caller: AccountName },

    #[error("account '{0}' has no address")]
    NoAddress(AccountName),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("integrity violation at height {height}: {reason}")]
    IntegrityViolation { height: u64, reason: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { kind, .. } => *kind,
            Self::Registry(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Type(e) => e.kind(),
            Self::QueueFull { .. } | Self::NoAddress(_) | Self::Config(_) => {
                ErrorKind::InvalidArgument
            }
            Self::IntentNotFound(_) => ErrorKind::NotFound,
            Self::NotIntentOwner { .. } => ErrorKind::NotOwner,
            Self::LockPoisoned(_) | Self::Serialization(_) | Self::IntegrityViolation { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Stable numeric code reported to callers.
    pub fn code(&self) -> u32 {
        self.kind().code()
    }
}

impl From<GateError> for LedgerError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Rejected { kind, reason } => Self::Rejected { kind, reason },
            other => Self::Rejected {
                kind: other.kind(),
                reason: other.to_string(),
            },
        }
    }
}
