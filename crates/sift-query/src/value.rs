//! Filter values.
//!
//! A filter category holds either bare strings or described values picked from an
//! autocomplete list. Both forms carry a single query value, read through
//! [`FilterValue::value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single value selected for a filter category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A bare value, e.g. typed into a search box.
    Plain(String),

    /// A value with display metadata.
    Described {
        /// The value that goes into the query.
        value: String,
        /// Text shown for this value in the UI.
        #[serde(default)]
        label: String,
        /// Longer description of the value.
        #[serde(default)]
        description: Option<String>,
    },
}

impl FilterValue {
    /// Creates a plain value.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::Plain(value.into())
    }

    /// Creates a described value.
    pub fn described(
        value: impl Into<String>,
        label: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self::Described {
            value: value.into(),
            label: label.into(),
            description,
        }
    }

    /// Returns the raw query value.
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Described { value, .. } => value,
        }
    }

    /// Returns true for described values.
    pub fn is_described(&self) -> bool {
        matches!(self, Self::Described { .. })
    }

    /// Decodes a list of JSON elements, dropping anything that is neither a string
    /// nor a `{value, label, description}` object.
    pub fn list_from_json(items: Vec<Value>) -> Vec<Self> {
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::plain(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

/// A field/value pair whose matches are removed from results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Index field to test.
    pub field: String,
    /// Value that disqualifies a document.
    pub value: String,
}

impl Exclusion {
    /// Creates an exclusion.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}
