//! Error types for filter state handling.
//!
//! Compilation itself never fails; these errors cover loading and mutating state
//! through untyped entry points.

use thiserror::Error;

use crate::Category;

/// Errors raised while loading or mutating a [`FilterState`](crate::FilterState).
#[derive(Debug, Error)]
pub enum StateError {
    /// A category name is not recognized.
    #[error("unknown filter category: {0}")]
    UnknownCategory(String),

    /// The category is not part of this deployment's defaults.
    #[error("filter category is not available in this index: {0}")]
    Unavailable(Category),

    /// A value does not have the shape the category stores.
    #[error("invalid value for {category}: expected {expected}")]
    Shape {
        /// Category being set.
        category: Category,
        /// Human-readable description of the accepted shapes.
        expected: &'static str,
    },

    /// The state document is not a JSON object.
    #[error("filter state must be a JSON object")]
    NotAnObject,

    /// The state document could not be decoded.
    #[error("failed to decode filter state: {0}")]
    Json(#[from] serde_json::Error),
}
