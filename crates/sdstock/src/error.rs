//! Error types for sdstock.
//!
//! Two families live here. [`Error`] covers infrastructure failures (opening
//! the database, configuration, I/O). [`ActionError`] is the outcome of a
//! rejected user action (checkout, return) and is what the workflow shows
//! to the user.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sdstock operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored row does not describe a valid card.
    #[error("corrupt card row: {0}")]
    CorruptRow(String),

    /// No card carries the given label.
    #[error("unknown card label: {0}")]
    UnknownLabel(String),

    /// The seed plan does not assign a capacity to some index.
    #[error("seed plan has no capacity for {container} index {index}")]
    SeedPlan {
        /// Container being seeded.
        container: String,
        /// Index without a capacity band.
        index: u32,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for sdstock operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a corrupt row error.
    #[must_use]
    pub fn corrupt_row(message: impl Into<String>) -> Self {
        Self::CorruptRow(message.into())
    }

    /// Create a config validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

/// Why a checkout or return was rejected.
///
/// None of these are retried; the user has to submit the action again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Required input is missing. No store call was made.
    #[error("{0}")]
    Validation(String),

    /// Some requested cards are not available. Nothing was checked out.
    #[error("the following cards cannot be checked out: {}", describe_cards(.ids, .labels))]
    Unavailable {
        /// Ids of the offending cards, ascending.
        ids: Vec<i64>,
        /// Labels of the offending cards that exist, in the same order.
        labels: Vec<Option<String>>,
    },

    /// The card is not checked out, so it cannot be returned.
    #[error("card #{id} cannot be returned: it is not checked out")]
    InvalidState {
        /// Id of the card.
        id: i64,
    },

    /// The store failed and the transaction was rolled back.
    ///
    /// The detail is for logs; the message shown to the user is fixed.
    #[error("an error occurred while saving, nothing was changed")]
    Store(String),
}

/// Result of a checkout or return.
pub type ActionResult<T> = std::result::Result<T, ActionError>;

impl ActionError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this error came from input validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the store itself.
    #[must_use]
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<rusqlite::Error> for ActionError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<Error> for ActionError {
    fn from(err: Error) -> Self {
        Self::Store(err.to_string())
    }
}

fn describe_cards(ids: &[i64], labels: &[Option<String>]) -> String {
    ids.iter()
        .zip(labels.iter().map(Option::as_deref).chain(std::iter::repeat(None)))
        .map(|(id, label)| match label {
            Some(label) => format!("{label} (#{id})"),
            None => format!("#{id}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
