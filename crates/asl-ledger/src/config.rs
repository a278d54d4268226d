use std::path::Path;

use serde::{Deserialize, Serialize};

use asl_gate::GateConfig;

use crate::error::LedgerError;

/// Ledger configuration.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Identifier of this node, recorded in block headers.
    pub node_id: u16,
    /// Maximum number of intents waiting for a confirmation.
    pub max_pending: usize,
    pub gate: GateConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            max_pending: 10_000,
            gate: GateConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, LedgerError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LedgerError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.max_pending == 0 {
            return Err(LedgerError::Config("max_pending must be at least 1".into()));
        }
        self.gate
            .validate()
            .map_err(|e| LedgerError::Config(e.to_string()))
    }
}
