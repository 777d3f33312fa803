//! Domain error types.
//!
//! These errors represent validation failures when building domain values.
//! They are distinct from fetch and render errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A departure or filter entry has no line name
    #[error("line name must not be empty")]
    EmptyLine,

    /// A departure has no direction
    #[error("direction must not be empty")]
    EmptyDirection,

    /// The same line appears twice in one filter
    #[error("line {0:?} is configured more than once")]
    DuplicateLine(String),
}
