//! Shared error surface for repositories, the lease manager, and other
//! external collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortsError {
    #[error("not found")]
    NotFound,

    #[error("lease contention: {0}")]
    LeaseContention(String),

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("unknown agent id '{0}'")]
    UnknownAgent(String),

    #[error("unknown action handler id '{0}'")]
    UnknownActionHandler(String),

    #[error("unknown rubric id '{0}'")]
    UnknownRubric(String),
}
