use asl_types::ErrorKind;

use crate::error::GateError;
use crate::intent::{Action, Intent};
use crate::stage::{GateContext, GateStage, StageDecision};

/// Spend-authority stage.
///
/// `Send` and `Burn` require the actor to own the source address.
/// `SendFrom` accepts either ownership or a delegated spend grant.
pub struct AuthorityStage;

impl GateStage for AuthorityStage {
    fn name(&self) -> &str {
        "authority"
    }

    fn evaluate(
        &self,
        intent: &Intent,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let actor = &intent.actor;
        let allowed = match &intent.action {
            Action::Create { .. } | Action::Issue { .. } => true,
            Action::Send { from, .. } => context.wallet.owns(actor, from),
            Action::Burn { owner, .. } => context.wallet.owns(actor, owner),
            Action::SendFrom { from, .. } => context.wallet.can_spend_from(actor, from),
        };

        if allowed {
            return Ok(StageDecision::Pass);
        }
        let source = intent
            .action
            .source()
            .map(ToString::to_string)
            .unwrap_or_default();
        Ok(StageDecision::fail(
            ErrorKind::UnauthorizedSpend,
            format!("account '{actor}' may not spend from {source}"),
        ))
    }
}
