//! User-facing error taxonomy of the workflow.
//!
//! Every remote failure is caught at the workflow boundary and turned into
//! a `WorkflowError`, which knows its notice text and how long the notice
//! stays on screen. Nothing here is retried automatically.

use std::time::Duration;

use thiserror::Error;

use crate::client::ClientError;
use crate::config::WorkflowConfig;

/// Rejection of a selected file before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Not an image: {mime_type}")]
    NotAnImage { mime_type: String },

    #[error("File too large: {size_bytes} bytes exceeds {max_bytes} bytes")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed")]
    Auth,

    #[error("Server error")]
    Server { detail: Option<String> },

    #[error("Backend unreachable")]
    Connection { port: Option<u16> },
}

impl WorkflowError {
    /// Notice text shown to the user (pt-BR).
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::NotAnImage { .. }) => {
                "Por favor, selecione apenas arquivos de imagem.".to_string()
            }
            Self::Validation(ValidationError::TooLarge { max_bytes, .. }) => format!(
                "O arquivo deve ter no máximo {}MB.",
                max_bytes / (1024 * 1024)
            ),
            Self::Auth => "Email ou senha incorretos.".to_string(),
            Self::Server { detail: Some(detail) } => format!("Erro no servidor: {detail}"),
            Self::Server { detail: None } => {
                "Erro de rede. Por favor, tente novamente.".to_string()
            }
            Self::Connection { port: Some(port) } => format!(
                "Não foi possível conectar ao servidor. Verifique se o backend está em execução na porta {port}."
            ),
            Self::Connection { port: None } => {
                "Não foi possível conectar ao servidor. Verifique se o backend está em execução."
                    .to_string()
            }
        }
    }

    /// How long the notice stays visible before auto-dismissal.
    pub fn dismiss_after(&self, config: &WorkflowConfig) -> Duration {
        match self {
            Self::Connection { .. } => config.connection_notice_duration,
            _ => config.notice_duration,
        }
    }

    /// Classify a transport error. `port` is where the backend is expected.
    pub fn from_client(err: &ClientError, port: Option<u16>) -> Self {
        match err {
            ClientError::Unauthorized | ClientError::Rejected(_) => Self::Auth,
            ClientError::Server { detail, .. } => Self::Server {
                detail: detail.clone(),
            },
            ClientError::Connection(_) | ClientError::Timeout(_) => Self::Connection { port },
            ClientError::Http { .. }
            | ClientError::ResponseParsing(_)
            | ClientError::InvalidArtifact(_)
            | ClientError::Setup(_) => Self::Server { detail: None },
        }
    }
}
