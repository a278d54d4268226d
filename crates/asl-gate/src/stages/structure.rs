use asl_types::ErrorKind;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::intent::{Action, Intent};
use crate::stage::{GateContext, GateStage, StageDecision};

/// Shape checks that need no ledger state.
///
/// Rejects zero quantities, out-of-range precision, and oversized
/// descriptions. Symbol and address syntax is already enforced by the
/// types themselves.
pub struct StructureStage {
    max_decimal_number: u8,
    max_description_len: usize,
}

impl StructureStage {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            max_decimal_number: config.max_decimal_number,
            max_description_len: config.max_description_len,
        }
    }
}

impl Default for StructureStage {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

impl GateStage for StructureStage {
    fn name(&self) -> &str {
        "structure"
    }

    fn evaluate(
        &self,
        intent: &Intent,
        _context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        if let Action::Create {
            decimal_number,
            description,
            ..
        } = &intent.action
        {
            if decimal_number.get() > self.max_decimal_number {
                return Ok(StageDecision::fail(
                    ErrorKind::InvalidArgument,
                    format!(
                        "decimal_number {} exceeds {}",
                        decimal_number.get(),
                        self.max_decimal_number
                    ),
                ));
            }
            if description.len() > self.max_description_len {
                return Ok(StageDecision::fail(
                    ErrorKind::InvalidArgument,
                    format!("description exceeds {} bytes", self.max_description_len),
                ));
            }
        }

        if intent.action.quantity().is_some_and(|q| q.is_zero()) {
            return Ok(StageDecision::fail(
                ErrorKind::InvalidArgument,
                "quantity must be greater than zero",
            ));
        }

        Ok(StageDecision::Pass)
    }
}
