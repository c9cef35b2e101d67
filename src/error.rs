use std::fmt::{Display, Formatter};

use thiserror::Error;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Errors raised by record, auth, export and HTTP operations.
///
/// Every variant ends up as a toast in the UI; only `Unauthorized` has a
/// navigation side effect (forced logout).
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User {id} not found")]
    NotFound { id: u64 },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Export failed: {0}")]
    ExportFailure(String),

    #[error("Session expired, please sign in again")]
    Unauthorized,

    #[error("Server responded with {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdminError {
    pub fn not_found(id: u64) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportFailure(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[derive(Debug)]
pub struct SimpleError(pub String);

impl SimpleError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

pub fn simple_error(msg: impl Into<String>) -> DynError {
    Box::new(SimpleError::new(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_ctx_prefixes_message() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = res.with_ctx(|| "open settings".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "open settings: gone");
    }

    #[test]
    fn admin_error_messages() {
        assert_eq!(AdminError::not_found(7).to_string(), "User 7 not found");
        assert_eq!(
            AdminError::validation("email", "is required").to_string(),
            "email: is required"
        );
        assert!(AdminError::Unauthorized.is_unauthorized());
        assert!(!AdminError::InvalidCredentials.is_unauthorized());
    }
}
