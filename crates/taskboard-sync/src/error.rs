use std::fmt;

use thiserror::Error;

/// The request a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Network response was not ok",
            Operation::Create => "Failed to post data",
            Operation::Update => "Failed to update data",
            Operation::Delete => "Failed to delete data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Failure of a single request against the task API.
///
/// Whatever the variant, only the rendered message reaches
/// [`SyncState`](crate::store::SyncState).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{0}")]
    Network(String),

    #[error("{} (HTTP {status})", .operation.failure_message())]
    Status { operation: Operation, status: u16 },

    #[error("{operation} returned an unreadable body: {message}")]
    Decode {
        operation: Operation,
        message: String,
    },
}

impl SyncError {
    pub fn network(err: impl fmt::Display) -> Self {
        SyncError::Network(err.to_string())
    }
}
