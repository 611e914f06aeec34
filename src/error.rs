//! Error type for the layout core.
//!
//! Policy problems (unresolved categories, self-loops, duplicate arrows,
//! totals anchored to a missing category) are not errors; they are handled
//! inside the layout pass. What ends up here are contract breaches by the
//! chart collaborator and malformed configuration values.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The chart resolved a category to `index` but has no stack bounds for it.
    #[error("chart returned no stack bounds for resolved category index {index}")]
    MissingStackBounds { index: usize },

    /// A stroke string such as `"#333 2"` could not be parsed.
    #[error("invalid stroke specification: {0:?}")]
    InvalidStroke(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
