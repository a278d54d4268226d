use asl_types::ErrorKind;

use crate::error::GateError;
use crate::intent::{Action, Intent};
use crate::stage::{GateContext, GateStage, StageDecision};

/// Checks the intent against asset definitions.
///
/// Creation needs a fresh symbol, plus the right cert for a dotted one. Issuance needs an unissued asset owned by
/// the actor with no issue already pending. Transfers and burns need an
/// issued asset; an asset whose issuance is still pending reports
/// `UnknownInput`, since its funds exist only unconfirmed.
pub struct RegistryStage;

impl GateStage for RegistryStage {
    fn name(&self) -> &str {
        "registry"
    }

    fn evaluate(
        &self,
        intent: &Intent,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let symbol = intent.action.symbol();
        match &intent.action {
            Action::Create { .. } => {
                if let Err(e) = context.registry.check_create(symbol, &intent.actor) {
                    return Ok(StageDecision::fail(e.kind(), e.to_string()));
                }
            }
            Action::Issue { .. } => {
                if let Err(e) = context.registry.check_issue(symbol, &intent.actor) {
                    return Ok(StageDecision::fail(e.kind(), e.to_string()));
                }
                if context.pending.is_issue_pending(symbol) {
                    return Ok(StageDecision::fail(
                        ErrorKind::AlreadyIssued,
                        format!("asset '{symbol}' already has an issue awaiting confirmation"),
                    ));
                }
            }
            Action::Send { .. } | Action::SendFrom { .. } | Action::Burn { .. } => {
                if context.registry.check_issued(symbol).is_err() {
                    if context.registry.contains(symbol) && context.pending.is_issue_pending(symbol)
                    {
                        return Ok(StageDecision::fail(
                            ErrorKind::UnknownInput,
                            format!("asset '{symbol}' is not issued until the next confirmation"),
                        ));
                    }
                    return Ok(StageDecision::fail(
                        ErrorKind::NotFound,
                        format!("issued asset '{symbol}' not found"),
                    ));
                }
            }
        }
        Ok(StageDecision::Pass)
    }
}
