//! Application error type.
//!
//! Every failure surfaces to `app::run` unchanged; `main` prints it and maps it
//! to a process exit code (2 = usage/config/credentials/files, 4 = remote data
//! or computation).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No API key could be obtained from the configured credential source.
    #[error("FRED API key unavailable: {0}")]
    CredentialMissing(String),

    /// The API answered with a non-2xx status.
    #[error("request to {endpoint} failed with status {status}: {excerpt}")]
    RemoteRequest {
        endpoint: String,
        status: u16,
        excerpt: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("request to {endpoint} could not be completed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("insufficient data for regression: {0}")]
    InsufficientData(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("chart rendering failed: {0}")]
    Plot(String),
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn malformed(endpoint: &str, message: impl Into<String>) -> Self {
        AppError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::CredentialMissing(_) | AppError::InvalidRequest(_) | AppError::Io { .. } => 2,
            AppError::RemoteRequest { .. }
            | AppError::Transport { .. }
            | AppError::MalformedResponse { .. }
            | AppError::InsufficientData(_)
            | AppError::Terminal(_)
            | AppError::Plot(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_split_usage_from_runtime_failures() {
        assert_eq!(AppError::CredentialMissing("x".into()).exit_code(), 2);
        assert_eq!(AppError::InvalidRequest("x".into()).exit_code(), 2);
        let remote = AppError::RemoteRequest {
            endpoint: "series/observations".into(),
            status: 404,
            excerpt: "not found".into(),
        };
        assert_eq!(remote.exit_code(), 4);
        assert_eq!(AppError::InsufficientData("x".into()).exit_code(), 4);
    }

    #[test]
    fn remote_error_message_names_status_and_endpoint() {
        let err = AppError::RemoteRequest {
            endpoint: "series/observations".into(),
            status: 400,
            excerpt: "Bad Request".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("series/observations"));
        assert!(msg.contains("400"));
        assert!(msg.contains("Bad Request"));
    }
}
