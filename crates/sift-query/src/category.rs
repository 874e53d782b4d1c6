//! Filter category names.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::StateError;

/// Every state key a search session recognizes.
///
/// Wire names are the camelCase keys used in filter-state documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Full-text terms with no field prefix.
    #[serde(rename = "all")]
    All,
    /// Dataset creators.
    #[serde(rename = "creator")]
    Creator,
    /// Taxonomic names matched across every rank.
    #[serde(rename = "taxon")]
    Taxon,
    /// Only results that document data, or specific data object ids.
    #[serde(rename = "documents")]
    Documents,
    /// Only results in a package, or specific resource map ids.
    #[serde(rename = "resourceMap")]
    ResourceMap,
    /// Lower bound of the year range.
    #[serde(rename = "yearMin")]
    YearMin,
    /// Upper bound of the year range.
    #[serde(rename = "yearMax")]
    YearMax,
    /// Restrict the year range to publication dates.
    #[serde(rename = "pubYear")]
    PubYear,
    /// Restrict the year range to temporal coverage.
    #[serde(rename = "dataYear")]
    DataYear,
    /// Result sort order.
    #[serde(rename = "sortOrder")]
    SortOrder,
    /// Whether sorting by popularity is offered.
    #[serde(rename = "sortByReads")]
    SortByReads,
    /// East map bound.
    #[serde(rename = "east")]
    East,
    /// West map bound.
    #[serde(rename = "west")]
    West,
    /// North map bound.
    #[serde(rename = "north")]
    North,
    /// South map bound.
    #[serde(rename = "south")]
    South,
    /// Whether the map filter is applied.
    #[serde(rename = "useGeohash")]
    UseGeohash,
    /// Geohash cells visible on the map.
    #[serde(rename = "geohashes", alias = "geohash")]
    Geohashes,
    /// Map zoom precision.
    #[serde(rename = "geohashLevel")]
    GeohashLevel,
    /// Aggregated geohash groups.
    #[serde(rename = "geohashGroups")]
    GeohashGroups,
    /// Member node the data came from.
    #[serde(rename = "dataSource")]
    DataSource,
    /// Account subjects matched against every permission field.
    #[serde(rename = "username")]
    Username,
    /// Rights holder subjects.
    #[serde(rename = "rightsHolder")]
    RightsHolder,
    /// Submitter subjects.
    #[serde(rename = "submitter")]
    Submitter,
    /// Geographic description.
    #[serde(rename = "spatial")]
    Spatial,
    /// Data attribute names.
    #[serde(rename = "attribute")]
    Attribute,
    /// Raw semantic annotation state key.
    #[serde(rename = "sem_annotation")]
    SemAnnotation,
    /// Semantic annotation URIs.
    #[serde(rename = "annotation")]
    Annotation,
    /// Raw query fragments.
    #[serde(rename = "additionalCriteria")]
    AdditionalCriteria,
    /// Identifiers matched across every identifier field.
    #[serde(rename = "id")]
    Id,
    /// Series identifiers.
    #[serde(rename = "seriesId")]
    SeriesId,
    /// Identifiers matched against id and seriesId only.
    #[serde(rename = "idOnly")]
    IdOnly,
    /// Provenance fields requested with results.
    #[serde(rename = "provFields")]
    ProvFields,
    /// Object format types.
    #[serde(rename = "formatType")]
    FormatType,
    /// Field/value pairs removed from results.
    #[serde(rename = "exclude")]
    Exclude,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 34] = [
        Self::All,
        Self::Creator,
        Self::Taxon,
        Self::Documents,
        Self::ResourceMap,
        Self::YearMin,
        Self::YearMax,
        Self::PubYear,
        Self::DataYear,
        Self::SortOrder,
        Self::SortByReads,
        Self::East,
        Self::West,
        Self::North,
        Self::South,
        Self::UseGeohash,
        Self::Geohashes,
        Self::GeohashLevel,
        Self::GeohashGroups,
        Self::DataSource,
        Self::Username,
        Self::RightsHolder,
        Self::Submitter,
        Self::Spatial,
        Self::Attribute,
        Self::SemAnnotation,
        Self::Annotation,
        Self::AdditionalCriteria,
        Self::Id,
        Self::SeriesId,
        Self::IdOnly,
        Self::ProvFields,
        Self::FormatType,
        Self::Exclude,
    ];

    /// Categories that belong to the map filter.
    pub const SPATIAL: [Self; 8] = [
        Self::UseGeohash,
        Self::Geohashes,
        Self::GeohashLevel,
        Self::GeohashGroups,
        Self::East,
        Self::West,
        Self::North,
        Self::South,
    ];

    /// Returns the wire name of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Creator => "creator",
            Self::Taxon => "taxon",
            Self::Documents => "documents",
            Self::ResourceMap => "resourceMap",
            Self::YearMin => "yearMin",
            Self::YearMax => "yearMax",
            Self::PubYear => "pubYear",
            Self::DataYear => "dataYear",
            Self::SortOrder => "sortOrder",
            Self::SortByReads => "sortByReads",
            Self::East => "east",
            Self::West => "west",
            Self::North => "north",
            Self::South => "south",
            Self::UseGeohash => "useGeohash",
            Self::Geohashes => "geohashes",
            Self::GeohashLevel => "geohashLevel",
            Self::GeohashGroups => "geohashGroups",
            Self::DataSource => "dataSource",
            Self::Username => "username",
            Self::RightsHolder => "rightsHolder",
            Self::Submitter => "submitter",
            Self::Spatial => "spatial",
            Self::Attribute => "attribute",
            Self::SemAnnotation => "sem_annotation",
            Self::Annotation => "annotation",
            Self::AdditionalCriteria => "additionalCriteria",
            Self::Id => "id",
            Self::SeriesId => "seriesId",
            Self::IdOnly => "idOnly",
            Self::ProvFields => "provFields",
            Self::FormatType => "formatType",
            Self::Exclude => "exclude",
        }
    }

    /// Returns true for map filter categories.
    pub fn is_spatial(self) -> bool {
        Self::SPATIAL.contains(&self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The compiler's map section is addressed as "geohash".
        if s == "geohash" {
            return Ok(Self::Geohashes);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StateError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn serde_names_match_as_str() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn geohash_alias() {
        assert_eq!("geohash".parse::<Category>().unwrap(), Category::Geohashes);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "colour".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn spatial_membership() {
        assert!(Category::North.is_spatial());
        assert!(Category::GeohashGroups.is_spatial());
        assert!(!Category::Spatial.is_spatial());
    }
}
