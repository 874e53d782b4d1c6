//! Facet count parameters.

use serde::Serialize;

use crate::{Category, FieldCatalog, FilterDefaults};

/// Facet names requested when the caller names none.
pub const DEFAULT_FACETS: &str = "keywords,origin,family,species,genus,kingdom,phylum,order,class,site";

/// Facet control parameters sent with every facet request.
pub const FACET_CONTROLS: [(&str, &str); 4] = [
    ("facet", "true"),
    ("facet.sort", "count"),
    ("facet.mincount", "1"),
    ("facet.limit", "-1"),
];

/// Parameters asking the index for facet counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetParams {
    /// Index fields to count, in request order.
    pub fields: Vec<String>,
}

impl FacetParams {
    /// Returns every parameter as a name/value pair, controls first.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        FACET_CONTROLS
            .iter()
            .copied()
            .chain(self.fields.iter().map(|f| ("facet.field", f.as_str())))
            .collect()
    }

    /// Renders the parameters as a query string fragment, each preceded by `&`.
    pub fn to_query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(name, value)| format!("&{name}={value}"))
            .collect()
    }
}

/// Builds facet parameters for a comma-separated list of facet names.
///
/// Category names expand through the catalog's facet mapping, so `taxon`
/// requests every rank. Without a list, the default facets are used, plus the
/// annotation and attribute facets when those categories are available.
pub fn build_facet_params(
    catalog: &FieldCatalog,
    availability: &FilterDefaults,
    fields: Option<&str>,
) -> FacetParams {
    let requested = match fields {
        Some(fields) => fields.to_string(),
        None => {
            let mut names = DEFAULT_FACETS.to_string();
            if availability.contains(Category::Annotation) {
                for field in catalog.facet_fields(Category::Annotation.as_str()) {
                    names.push(',');
                    names.push_str(field);
                }
            }
            if availability.contains(Category::Attribute) {
                names.push_str(",attributeName,attributeLabel");
            }
            names
        }
    };

    let fields = requested
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .flat_map(|name| catalog.facet_fields(name))
        .map(str::to_string)
        .collect();
    FacetParams { fields }
}
