use asl_types::ErrorKind;

/// Failures raised by the gate pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// A stage rejected the intent.
    #[error("{kind}: {reason}")]
    Rejected { kind: ErrorKind, reason: String },

    /// A stage could not reach a decision.
    #[error("stage '{stage}' failed: {message}")]
    StageError { stage: String, message: String },

    #[error("invalid gate config: {0}")]
    Config(String),
}

impl GateError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { kind, .. } => *kind,
            Self::StageError { .. } => ErrorKind::Internal,
            Self::Config(_) => ErrorKind::InvalidArgument,
        }
    }
}
