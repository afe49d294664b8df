use thiserror::Error;

use crate::gateway::GatewayError;

/// Client-level error type.
/// Every stage action returns `Result<T, AppError>`; `inline_message` is what the
/// stage shows next to its trigger.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No analysis loaded")]
    NoAnalysis,

    #[error("{0} is already running")]
    Busy(&'static str),

    #[error("Result discarded: the session was reset while the request was in flight")]
    Superseded,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short category code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::NoAnalysis => "NO_ANALYSIS",
            AppError::Busy(_) => "BUSY",
            AppError::Superseded => "SUPERSEDED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Renders the non-fatal message a stage displays inline.
    pub fn inline_message(&self) -> String {
        match self {
            AppError::Transport(msg) => {
                tracing::error!("Transport error: {msg}");
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Provider(msg) => {
                tracing::error!("Provider error: {msg}");
                msg.clone()
            }
            AppError::Persistence(msg) => {
                tracing::warn!("Persistence error: {msg}");
                "Saved jobs could not be written to disk; changes are kept for this session."
                    .to_string()
            }
            AppError::NoAnalysis => "Upload a resume first.".to_string(),
            AppError::Busy(op) => format!("{op} is already running."),
            AppError::Superseded => "Discarded: the session was reset before this finished.".to_string(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => AppError::Transport(msg),
            GatewayError::Rejected { message, .. } => AppError::Validation(message),
            GatewayError::Failed { status, message } => {
                AppError::Provider(format!("{message} (status {status})"))
            }
            GatewayError::Decode(e) => AppError::Provider(format!("Malformed response: {e}")),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}
