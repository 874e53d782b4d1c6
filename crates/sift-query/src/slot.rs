//! Stored category values and the defaults table.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{Category, Exclusion, FilterValue, GeohashGroups, StateError};

/// Earliest year offered by the year range filter.
pub const DEFAULT_YEAR_MIN: i32 = 1900;

/// Default map zoom precision.
pub const DEFAULT_GEOHASH_LEVEL: u8 = 9;

/// Default result ordering.
pub const DEFAULT_SORT_ORDER: &str = "dateUploaded+desc";

/// The value stored for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterSlot {
    /// No value (unset map bounds).
    Null,
    /// A binary setting.
    Flag(bool),
    /// A year, coordinate or precision.
    Number(f64),
    /// A single string.
    Text(String),
    /// An ordered list of selected values.
    Values(Vec<FilterValue>),
    /// Field/value pairs to exclude.
    Exclusions(Vec<Exclusion>),
    /// Aggregated geohash groups.
    Groups(GeohashGroups),
}

impl FilterSlot {
    /// Builds a list slot from anything convertible to filter values.
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// Returns true when the slot holds nothing a query could use.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null | Self::Flag(false) => true,
            Self::Flag(true) | Self::Number(_) => false,
            Self::Text(s) => s.is_empty(),
            Self::Values(v) => v.is_empty(),
            Self::Exclusions(v) => v.is_empty(),
            Self::Groups(g) => g.is_empty(),
        }
    }

    /// Decodes a JSON value into the slot shape `category` stores.
    ///
    /// List elements that are neither strings nor described objects are dropped.
    pub fn from_json(category: Category, value: Value) -> Result<Self, StateError> {
        let slot = match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Flag(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => match category {
                Category::Exclude => Self::Exclusions(
                    items
                        .into_iter()
                        .filter_map(|item| serde_json::from_value(item).ok())
                        .collect(),
                ),
                Category::GeohashGroups => {
                    Self::Groups(serde_json::from_value(Value::Array(items))?)
                }
                _ => Self::Values(FilterValue::list_from_json(items)),
            },
            Value::Object(_) => {
                return Err(StateError::Shape {
                    category,
                    expected: expected_shape(category),
                });
            }
        };
        check_shape(category, &slot)?;
        Ok(slot)
    }
}

impl From<bool> for FilterSlot {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<FilterValue>> for FilterSlot {
    fn from(values: Vec<FilterValue>) -> Self {
        Self::Values(values)
    }
}

/// Returns true when `slot` is a shape `category` can hold.
fn accepts(category: Category, slot: &FilterSlot) -> bool {
    use Category as C;
    use FilterSlot as S;

    match (category, slot) {
        (C::Creator | C::Spatial | C::Id, S::Values(_) | S::Text(_))
        | (C::Documents | C::ResourceMap, S::Values(_) | S::Flag(_))
        | (C::PubYear | C::DataYear | C::SortByReads | C::UseGeohash, S::Flag(_))
        | (C::YearMin | C::YearMax | C::GeohashLevel, S::Number(_))
        | (C::East | C::West | C::North | C::South, S::Null | S::Number(_))
        | (C::SortOrder, S::Text(_))
        | (C::Exclude, S::Exclusions(_))
        | (C::GeohashGroups, S::Groups(_)) => true,
        (
            C::All
            | C::Taxon
            | C::Geohashes
            | C::DataSource
            | C::Username
            | C::RightsHolder
            | C::Submitter
            | C::Attribute
            | C::SemAnnotation
            | C::Annotation
            | C::AdditionalCriteria
            | C::SeriesId
            | C::IdOnly
            | C::ProvFields
            | C::FormatType,
            S::Values(_),
        ) => true,
        _ => false,
    }
}

/// Describes the shapes `category` accepts, for error messages.
fn expected_shape(category: Category) -> &'static str {
    use Category as C;

    match category {
        C::Creator | C::Spatial | C::Id => "a list of values or a string",
        C::Documents | C::ResourceMap => "a list of ids or a boolean",
        C::PubYear | C::DataYear | C::SortByReads | C::UseGeohash => "a boolean",
        C::YearMin | C::YearMax | C::GeohashLevel => "a number",
        C::East | C::West | C::North | C::South => "a number or null",
        C::SortOrder => "a string",
        C::Exclude => "a list of {field, value} objects",
        C::GeohashGroups => "a list of geohash groups",
        _ => "a list of values",
    }
}

/// Validates that `slot` fits `category`.
pub fn check_shape(category: Category, slot: &FilterSlot) -> Result<(), StateError> {
    if accepts(category, slot) {
        Ok(())
    } else {
        Err(StateError::Shape {
            category,
            expected: expected_shape(category),
        })
    }
}

/// The immutable table a search session starts from.
///
/// A category missing from the table is not available in the deployment: it is
/// never compiled and cannot be set.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefaults {
    /// Default slot for every available category.
    slots: BTreeMap<Category, FilterSlot>,
}

impl FilterDefaults {
    /// Returns the standard catalog search defaults, with the year range ending
    /// at the current UTC year.
    pub fn standard() -> Self {
        Self::for_year(Utc::now().year())
    }

    /// Returns the standard defaults with the year range ending at `year_max`.
    pub fn for_year(year_max: i32) -> Self {
        use Category as C;

        let empty = || FilterSlot::Values(Vec::new());
        let mut slots = BTreeMap::new();
        for category in [
            C::All,
            C::Creator,
            C::Taxon,
            C::DataSource,
            C::Username,
            C::RightsHolder,
            C::Submitter,
            C::Spatial,
            C::Attribute,
            C::SemAnnotation,
            C::Annotation,
            C::AdditionalCriteria,
            C::Id,
            C::SeriesId,
            C::IdOnly,
            C::ProvFields,
            C::Geohashes,
        ] {
            slots.insert(category, empty());
        }
        for category in [
            C::Documents,
            C::ResourceMap,
            C::PubYear,
            C::DataYear,
            C::SortByReads,
        ] {
            slots.insert(category, FilterSlot::Flag(false));
        }
        for category in [C::East, C::West, C::North, C::South] {
            slots.insert(category, FilterSlot::Null);
        }
        slots.insert(C::YearMin, FilterSlot::Number(f64::from(DEFAULT_YEAR_MIN)));
        slots.insert(C::YearMax, FilterSlot::Number(f64::from(year_max)));
        slots.insert(C::SortOrder, FilterSlot::Text(DEFAULT_SORT_ORDER.into()));
        slots.insert(C::UseGeohash, FilterSlot::Flag(true));
        slots.insert(
            C::GeohashLevel,
            FilterSlot::Number(f64::from(DEFAULT_GEOHASH_LEVEL)),
        );
        slots.insert(C::GeohashGroups, FilterSlot::Groups(GeohashGroups::default()));
        slots.insert(
            C::FormatType,
            FilterSlot::Values(vec![FilterValue::described(
                "METADATA",
                "science metadata",
                None,
            )]),
        );
        slots.insert(
            C::Exclude,
            FilterSlot::Exclusions(vec![
                Exclusion::new("obsoletedBy", "*"),
                Exclusion::new("formatId", "*dataone.org/collections*"),
                Exclusion::new("formatId", "*dataone.org/portals*"),
            ]),
        );

        Self { slots }
    }

    /// Removes categories the deployment's index does not support.
    pub fn without(mut self, categories: &[Category]) -> Self {
        for category in categories {
            self.slots.remove(category);
        }
        self
    }

    /// Replaces the default for one category.
    pub fn with(mut self, category: Category, slot: FilterSlot) -> Result<Self, StateError> {
        check_shape(category, &slot)?;
        self.slots.insert(category, slot);
        Ok(self)
    }

    /// Returns the default slot for `category`.
    pub fn get(&self, category: Category) -> Option<&FilterSlot> {
        self.slots.get(&category)
    }

    /// Returns true when `category` is part of this table.
    pub fn contains(&self, category: Category) -> bool {
        self.slots.contains_key(&category)
    }

    /// Iterates over every default.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &FilterSlot)> {
        self.slots.iter().map(|(c, s)| (*c, s))
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self::standard()
    }
}
