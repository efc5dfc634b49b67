use thiserror::Error;

/// Faults reported synchronously by list operations.
///
/// Errors are never delivered through the change-event channel; a mutation
/// that fails leaves the sequence untouched and its listeners uninvoked.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("value rejected by the active filter predicate")]
    RejectedByPredicate,
}
