//! Error and outcome types for the circulation operations.

use std::fmt;

use thiserror::Error;

/// Why a checkout or return did not go through. The `Display` text is what
/// the shell prints to the patron.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Book not found.")]
    NotFound,

    #[error("{title} is not available for checkout.")]
    AlreadyCheckedOut { title: String },

    #[error("Book is not borrowed by the specified patron or transaction record not found.")]
    NotBorrowedByThisPatron,

    #[error("{title} is already available.")]
    AlreadyAvailable { title: String },

    #[error("Database connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("Error executing SQL query: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Coarse result of a write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("success"),
            Status::Error => f.write_str("error"),
        }
    }
}

/// Status plus human-readable message, the shape callers of the write
/// operations consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub status: Status,
    /// Text shown to the patron, success or failure alike.
    pub message: String,
}

impl TransactionOutcome {
    /// A successful outcome carrying `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl From<LibraryError> for TransactionOutcome {
    fn from(err: LibraryError) -> Self {
        Self {
            status: Status::Error,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_out_message_names_the_title() {
        let outcome = TransactionOutcome::from(LibraryError::AlreadyCheckedOut {
            title: "Great Expectations".to_string(),
        });
        assert_eq!(outcome.status, Status::Error);
        assert_eq!(
            outcome.message,
            "Great Expectations is not available for checkout."
        );
    }

    #[test]
    fn status_renders_lowercase() {
        assert_eq!(Status::Success.to_string(), "success");
        assert_eq!(Status::Error.to_string(), "error");
    }
}
