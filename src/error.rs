//! Error types for agentform.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Verification problems are not errors: they are collected as diagnostics by
//! [`crate::verify`] and only surface here as [`AgentformError::ValidationFailed`]
//! when a command refuses to continue.

use crate::exit_codes;
use crate::provider::ProviderError;
use thiserror::Error;

/// Main error type for agentform operations.
#[derive(Error, Debug)]
pub enum AgentformError {
    /// A required field is absent from a resource block.
    #[error("{kind}.{name}: missing required field '{field}'")]
    MissingField {
        kind: String,
        name: String,
        field: String,
    },

    /// A field is present but holds the wrong primitive type.
    #[error("{kind}.{name}: field '{field}' must be {expected}, found {actual}")]
    InvalidFieldType {
        kind: String,
        name: String,
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The document itself is malformed (bad TOML, sections that are not tables).
    #[error("invalid configuration document: {0}")]
    Document(String),

    /// A `type`/`runtime` value has no registered implementation.
    #[error("{kind}.{name}: unsupported {field} '{value}'")]
    UnsupportedKind {
        kind: String,
        name: String,
        field: String,
        value: String,
    },

    /// An indirection token could not be resolved at instantiation time.
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// The language-model or embedding collaborator failed.
    #[error("model call failed: {0}")]
    ModelCall(#[from] ProviderError),

    /// Verification reported violations and the command will not continue.
    #[error("verification failed with {0} violation(s); run `agentform verify` for details")]
    ValidationFailed(usize),

    /// Filesystem failure.
    #[error("{0}")]
    Io(String),

    /// User provided invalid arguments or the project is in an unusable state.
    #[error("{0}")]
    UserError(String),

    /// A deployment runtime failed to start or serve.
    #[error("deployment failed: {0}")]
    Deploy(String),
}

impl AgentformError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentformError::MissingField { .. }
            | AgentformError::InvalidFieldType { .. }
            | AgentformError::Document(_)
            | AgentformError::ValidationFailed(_) => exit_codes::VALIDATION_FAILURE,
            AgentformError::UnsupportedKind { .. }
            | AgentformError::Unresolved(_)
            | AgentformError::Io(_)
            | AgentformError::UserError(_) => exit_codes::USER_ERROR,
            AgentformError::ModelCall(_) => exit_codes::MODEL_FAILURE,
            AgentformError::Deploy(_) => exit_codes::DEPLOY_FAILURE,
        }
    }
}

/// Result type alias for agentform operations.
pub type Result<T> = std::result::Result<T, AgentformError>;
