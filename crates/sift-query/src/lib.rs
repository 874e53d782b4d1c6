//! Faceted search query compilation.
//!
//! This crate turns the filters selected in a catalog search session into a
//! single Lucene/Solr query string:
//!
//! - **State**: [`FilterState`] holds a value per [`Category`], seeded from a
//!   [`FilterDefaults`] table
//! - **Fields**: [`FieldCatalog`] maps categories to index and facet fields
//! - **Clauses**: [`needs_quotes`], [`escape_special_char`], [`grouped_query`]
//!   and [`multi_field_query`] build fragments that never break query syntax
//! - **Map filter**: [`group_geohashes`] collapses complete geohash tiles
//! - **Compilation**: [`QueryCompiler`] joins every category's clause in a fixed
//!   order
//! - **Facets**: [`build_facet_params`] requests aggregate counts
//!
//! # Example
//!
//! ```
//! use sift_query::{Category, CompilerConfig, FieldCatalog, FilterState, compile};
//!
//! let mut state = FilterState::default();
//! state.set_values(Category::All, ["salmon"]).unwrap();
//! state.set_values(Category::Creator, ["Kibele"]).unwrap();
//!
//! let query = compile(&state, &FieldCatalog::standard(), &CompilerConfig::default(), None);
//! assert_eq!(query.text, "salmon AND originText:Kibele");
//! ```

#![warn(missing_docs)]

mod catalog;
mod category;
mod clause;
mod compile;
mod config;
mod error;
mod facet;
mod geohash;
mod slot;
mod state;
mod value;

pub use catalog::{FieldCatalog, PROVENANCE_FIELDS};
pub use category::Category;
pub use clause::{
    ClauseOptions, Encoding, Operator, encode_escaped, escape_special_char, format_value,
    grouped_query, multi_field_query, needs_quotes,
};
pub use compile::{CompiledQuery, QueryCompiler, compile};
pub use config::{
    CompilerConfig, DEFAULT_GEOHASH_QUERY_LIMIT, DEFAULT_URL_LENGTH_LIMIT, Transport,
};
pub use error::StateError;
pub use facet::{DEFAULT_FACETS, FACET_CONTROLS, FacetParams, build_facet_params};
pub use geohash::{
    ClauseBudget, GEOHASH_ALPHABET, GEOHASH_BRANCHING, GeohashGroup, GeohashGroups,
    SpatialClause, geohash_clause, group_geohashes,
};
pub use slot::{
    DEFAULT_GEOHASH_LEVEL, DEFAULT_SORT_ORDER, DEFAULT_YEAR_MIN, FilterDefaults, FilterSlot,
};
pub use state::FilterState;
pub use value::{Exclusion, FilterValue};
