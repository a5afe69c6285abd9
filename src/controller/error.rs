use thiserror::Error;

use crate::model::WindowId;

#[derive(Debug, Error)]
pub enum WindowError {
    /// The caller supplied a malformed request: a negative size, or an
    /// archetype/owner combination that violates the ownership rules.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The native window system failed to create or operate on a window.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The request named a window that is not (or is no longer) registered.
    #[error("{0} is not a live window")]
    NotFound(WindowId),
}
