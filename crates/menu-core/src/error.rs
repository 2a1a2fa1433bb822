//! Domain errors

use thiserror::Error;

use crate::domain::MenuId;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu item not found: {0}")]
    NotFound(MenuId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Store error during {context}: {message}")]
    Store {
        context: &'static str,
        message: String,
    },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

/// Transport-agnostic classification; the API layer maps it to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidOperation,
    StoreFailure,
    Cancelled,
}

impl MenuError {
    pub fn store(context: &'static str, err: impl std::fmt::Display) -> Self {
        MenuError::Store {
            context,
            message: err.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        MenuError::InvalidOperation(message.into())
    }

    /// Re-label a store failure with the step that was running when it failed.
    /// Other variants pass through untouched.
    pub fn during(self, step: &'static str) -> Self {
        match self {
            MenuError::Store { message, .. } => MenuError::Store {
                context: step,
                message,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MenuError::NotFound(_) => ErrorKind::NotFound,
            MenuError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            MenuError::Store { .. } => ErrorKind::StoreFailure,
            MenuError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<validator::ValidationErrors> for MenuError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MenuError::InvalidOperation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_during_relabels_only_store_errors() {
        let err = MenuError::store("query", "connection reset").during("load destination siblings");
        assert_eq!(
            err.to_string(),
            "Store error during load destination siblings: connection reset"
        );
        assert_eq!(err.kind(), ErrorKind::StoreFailure);

        let err = MenuError::NotFound(7).during("load item");
        assert!(matches!(err, MenuError::NotFound(7)));
    }
}
