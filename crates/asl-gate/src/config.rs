use serde::{Deserialize, Serialize};

use asl_registry::InMemoryRegistry;
use asl_types::DecimalNumber;

use crate::error::GateError;

/// Configuration for the intent gate pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Largest decimal precision accepted when creating an asset.
    pub max_decimal_number: u8,
    /// Maximum asset description length in bytes. May be lowered but not
    /// raised past [`InMemoryRegistry::MAX_DESCRIPTION_LEN`].
    pub max_description_len: usize,
    /// When `true`, the authority stage is left out of the default pipeline:
    /// any account may move funds from any address. Structure, registry and
    /// funds checks always run because they protect ledger invariants.
    pub permissive: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_decimal_number: DecimalNumber::MAX,
            max_description_len: InMemoryRegistry::MAX_DESCRIPTION_LEN,
            permissive: false,
        }
    }
}

impl GateConfig {
    /// A configuration without spend-authority checks, for local tooling.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_decimal_number > DecimalNumber::MAX {
            return Err(GateError::Config(format!(
                "max_decimal_number {} exceeds {}",
                self.max_decimal_number,
                DecimalNumber::MAX
            )));
        }
        if self.max_description_len > InMemoryRegistry::MAX_DESCRIPTION_LEN {
            return Err(GateError::Config(format!(
                "max_description_len {} exceeds the registry limit of {}",
                self.max_description_len,
                InMemoryRegistry::MAX_DESCRIPTION_LEN
            )));
        }
        Ok(())
    }
}
