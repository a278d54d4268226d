use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing or parsing foundation types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid symbol '{symbol}': {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("account name must not be empty")]
    EmptyAccount,

    #[error("decimal number {actual} exceeds maximum of {max}")]
    DecimalOutOfRange { actual: u8, max: u8 },

    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),

    #[error("quantity overflow")]
    QuantityOverflow,
}

impl TypeError {
    /// Every type error is a malformed caller argument.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Classification of every failure an intent can produce.
///
/// Codes are stable and are what external callers observe next to the
/// human-readable message. `0` is reserved for success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed symbol, address, quantity, or other parameter.
    InvalidArgument,
    /// The caller may not move funds from the source address.
    UnauthorizedSpend,
    /// The source holds less than the requested quantity.
    InsufficientFunds,
    /// The intent depends on outputs that are not yet confirmed.
    UnknownInput,
    /// No asset (or pending intent) with the given identifier exists.
    NotFound,
    /// The symbol is already registered.
    DuplicateSymbol,
    /// The caller is not the issuer of the asset.
    NotOwner,
    /// The asset has already been issued (or its issuance is pending).
    AlreadyIssued,
    /// Lock poisoning, serialization failure, or another internal fault.
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        Self::InvalidArgument,
        Self::UnauthorizedSpend,
        Self::InsufficientFunds,
        Self::UnknownInput,
        Self::NotFound,
        Self::DuplicateSymbol,
        Self::NotOwner,
        Self::AlreadyIssued,
        Self::Internal,
    ];

    /// The numeric code reported to callers.
    pub const fn code(self) -> u32 {
        match self {
            Self::InvalidArgument => 1021,
            Self::UnauthorizedSpend => 3001,
            Self::InsufficientFunds => 5001,
            Self::UnknownInput => 5002,
            Self::NotFound => 5101,
            Self::DuplicateSymbol => 5102,
            Self::NotOwner => 5103,
            Self::AlreadyIssued => 5104,
            Self::Internal => 9999,
        }
    }

    /// Reverse lookup of [`Self::code`].
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::UnauthorizedSpend => "unauthorized_spend",
            Self::InsufficientFunds => "insufficient_funds",
            Self::UnknownInput => "unknown_input",
            Self::NotFound => "not_found",
            Self::DuplicateSymbol => "duplicate_symbol",
            Self::NotOwner => "not_owner",
            Self::AlreadyIssued => "already_issued",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn insufficient_funds_code_is_5001() {
        assert_eq!(ErrorKind::InsufficientFunds.code(), 5001);
    }

    #[test]
    fn codes_are_unique_and_nonzero() {
        let codes: HashSet<u32> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn from_code_inverts_code() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(0), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ErrorKind::AlreadyIssued).unwrap();
        assert_eq!(json, "\"already_issued\"");
        assert_eq!(ErrorKind::AlreadyIssued.to_string(), "already_issued");
    }

    #[test]
    fn type_errors_are_invalid_arguments() {
        assert_eq!(TypeError::EmptyAccount.kind(), ErrorKind::InvalidArgument);
    }
}
