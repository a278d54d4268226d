use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Globally unique asset name.
///
/// Symbols are compared exactly: `GOLD` and `gold` are different assets.
/// Allowed characters are ASCII letters, digits and `.`; the length is
/// bounded by [`Symbol::MAX_LEN`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Maximum symbol length in bytes.
    pub const MAX_LEN: usize = 64;

    pub fn new(symbol: impl Into<String>) -> Result<Self, TypeError> {
        let symbol = symbol.into();
        let invalid = |reason: &str| TypeError::InvalidSymbol {
            symbol: symbol.clone(),
            reason: reason.into(),
        };

        if symbol.is_empty() {
            return Err(invalid("symbol must not be empty"));
        }
        if symbol.len() > Self::MAX_LEN {
            return Err(invalid("symbol length must not exceed 64"));
        }
        if !symbol
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.')
        {
            return Err(invalid("only ASCII letters, digits and '.' are allowed"));
        }
        if symbol.starts_with('.') || symbol.ends_with('.') {
            return Err(invalid("symbol must not start or end with '.'"));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the symbol has a `DOMAIN.NAME` shape.
    pub fn is_dotted(&self) -> bool {
        self.0.contains('.')
    }

    /// The part before the first `.`, or the whole symbol when undotted.
    ///
    /// `"MVS.TST"` has domain `"MVS"`.
    pub fn domain(&self) -> Symbol {
        match self.0.split_once('.') {
            Some((domain, _)) => Self(domain.to_string()),
            None => self.clone(),
        }
    }
}

impl TryFrom<String> for Symbol {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl FromStr for Symbol {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
