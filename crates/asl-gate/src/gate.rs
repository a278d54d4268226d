use std::time::{Duration, Instant};

use tracing::debug;

use asl_types::ErrorKind;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::intent::Intent;
use crate::stage::{GateContext, GateStage, StageDecision, StageResult};
use crate::stages::{AuthorityStage, FundsStage, RegistryStage, StructureStage};

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// Final decision of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected { kind: ErrorKind, reason: String },
}

/// Verdict plus the per-stage trace that led to it.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub verdict: Verdict,
    pub stage_results: Vec<StageResult>,
    pub elapsed: Duration,
}

impl GateResult {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// Convert a rejection into [`GateError::Rejected`].
    pub fn into_result(self) -> Result<(), GateError> {
        match self.verdict {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected { kind, reason } => Err(GateError::Rejected { kind, reason }),
        }
    }
}

// ---------------------------------------------------------------------------
// IntentGate
// ---------------------------------------------------------------------------

/// The intent gate: a pipeline of stages every intent passes through
/// before it is queued, and again before it is applied.
pub struct IntentGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl IntentGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Gate running structure, registry, authority and funds, in that order.
    ///
    /// The authority stage is left out when `config.permissive` is set.
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(StructureStage::from_config(&gate.config)));
        gate.add_stage(Box::new(RegistryStage));
        if !gate.config.permissive {
            gate.add_stage(Box::new(AuthorityStage));
        }
        gate.add_stage(Box::new(FundsStage));
        gate
    }

    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `intent` through every stage, stopping at the first failure.
    ///
    /// An `Err` means a stage could not reach a decision at all.
    pub fn evaluate(
        &self,
        intent: &Intent,
        context: &GateContext<'_>,
    ) -> Result<GateResult, GateError> {
        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(intent, context)?;

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail { reason, .. } => Some(reason.clone()),
                },
                elapsed: stage_start.elapsed(),
            };
            stage_results.push(result);

            if let StageDecision::Fail { kind, reason } = decision {
                debug!(intent = %intent.id, stage = stage.name(), %kind, %reason, "intent rejected");
                return Ok(GateResult {
                    verdict: Verdict::Rejected { kind, reason },
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateResult {
            verdict: Verdict::Accepted,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }

    /// Evaluate and collapse the outcome into a `Result`.
    pub fn check(&self, intent: &Intent, context: &GateContext<'_>) -> Result<(), GateError> {
        self.evaluate(intent, context)?.into_result()
    }
}
