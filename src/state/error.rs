//! State management-specific error types.

/// Errors that can occur during state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Action needs an active task and there is none
    #[error("No active task")]
    NoActiveTask,

    /// Item form submitted without a code
    #[error("Serial number / code is required")]
    EmptyCode,

    /// Referenced item is not part of the active task
    #[error("Item not found in active task: {id}")]
    ItemNotLoaded { id: i64 },
}
