use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("ValidationError: {0}")]
    Validation(String),
    #[error("ValidationError: request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("TimeoutError: solver did not answer within {0:?}")]
    Timeout(Duration),
    #[error("SolverContractViolation: {0}")]
    ContractViolation(String),
    #[error("RelabelError: {0}")]
    Relabel(String),
    #[error("ConfigError: {0}")]
    Config(String),
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("MethodNotAllowed: {0}")]
    MethodNotAllowed(String),
    #[error("RateLimited: {0}")]
    RateLimited(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
}

/// Coarse classification of a [`GatewayError`], reported to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Transport,
    Timeout,
    SolverContractViolation,
    RelabelInconsistency,
    NotFound,
    MethodNotAllowed,
    RateLimited,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::SolverContractViolation => "solver_contract_violation",
            ErrorKind::RelabelInconsistency => "relabel_inconsistency",
            ErrorKind::NotFound => "not_found",
            ErrorKind::MethodNotAllowed => "method_not_allowed",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) | GatewayError::PayloadTooLarge(_) => ErrorKind::Validation,
            GatewayError::Transport(_) => ErrorKind::Transport,
            GatewayError::Timeout(_) => ErrorKind::Timeout,
            GatewayError::ContractViolation(_) => ErrorKind::SolverContractViolation,
            GatewayError::Relabel(_) => ErrorKind::RelabelInconsistency,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            GatewayError::RateLimited(_) => ErrorKind::RateLimited,
            GatewayError::Config(_)
            | GatewayError::Io(_)
            | GatewayError::Json(_)
            | GatewayError::Hyper(_) => ErrorKind::Internal,
        }
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Transport => StatusCode::BAD_GATEWAY,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
                ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::SolverContractViolation
                | ErrorKind::RelabelInconsistency
                | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        let err = GatewayError::Validation("k must be at least 1".to_owned());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = GatewayError::PayloadTooLarge(16);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = GatewayError::RateLimited("127.0.0.1".to_owned());
        assert_eq!(err.kind().as_str(), "rate_limited");
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_solver_side_errors_are_distinct() {
        let transport = GatewayError::Transport("connection refused".to_owned());
        let timeout = GatewayError::Timeout(Duration::from_secs(1));
        let violation = GatewayError::ContractViolation("missing coloring".to_owned());
        let relabel = GatewayError::Relabel("unknown id 7".to_owned());
        assert_eq!(transport.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(violation.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(relabel.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(violation.kind(), relabel.kind());
        assert_eq!(violation.kind().as_str(), "solver_contract_violation");
        assert_eq!(relabel.kind().to_string(), "relabel_inconsistency");
    }
}
