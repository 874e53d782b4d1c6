//! Mapping from filter categories to index fields.

use std::collections::BTreeMap;

use crate::Category;

/// Provenance fields requested alongside search results.
pub const PROVENANCE_FIELDS: [&str; 22] = [
    "prov_generated",
    "prov_generatedByDataONEDN",
    "prov_generatedByExecution",
    "prov_generatedByFoafName",
    "prov_generatedByOrcid",
    "prov_generatedByProgram",
    "prov_generatedByUser",
    "prov_hasDerivations",
    "prov_hasSources",
    "prov_instanceOfClass",
    "prov_used",
    "prov_usedByDataONEDN",
    "prov_usedByExecution",
    "prov_usedByFoafName",
    "prov_usedByOrcid",
    "prov_usedByProgram",
    "prov_usedByUser",
    "prov_wasDerivedFrom",
    "prov_wasExecutedByExecution",
    "prov_wasExecutedByUser",
    "prov_wasGeneratedBy",
    "prov_wasInformedBy",
];

/// Taxonomic rank fields, broadest first.
const TAXON_RANKS: [&str; 7] = [
    "kingdom", "phylum", "class", "order", "family", "genus", "species",
];

/// Index field names, facet field names and display labels per category.
///
/// Categories without an entry map to a field of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    /// Query fields per category.
    fields: BTreeMap<Category, Vec<String>>,
    /// Facet fields per category.
    facets: BTreeMap<Category, Vec<String>>,
    /// Display labels per category.
    labels: BTreeMap<Category, String>,
}

/// Builds a field list from string literals.
fn list(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

impl FieldCatalog {
    /// Returns the catalog for the standard search index.
    pub fn standard() -> Self {
        use Category as C;

        let fields = BTreeMap::from([
            (C::Attribute, list(&["attribute"])),
            (C::Annotation, list(&["sem_annotation"])),
            (C::DataSource, list(&["datasource"])),
            (C::Documents, list(&["documents"])),
            (C::FormatType, list(&["formatType"])),
            (C::All, list(&[""])),
            (C::Creator, list(&["originText"])),
            (C::Spatial, list(&["siteText"])),
            (C::ResourceMap, list(&["resourceMap"])),
            (C::PubYear, list(&["datePublished", "dateUploaded"])),
            (C::DataYear, list(&["beginDate", "endDate"])),
            (
                C::Id,
                list(&["id", "identifier", "documents", "resourceMap", "seriesId"]),
            ),
            (C::IdOnly, list(&["id", "seriesId"])),
            (C::RightsHolder, list(&["rightsHolder"])),
            (C::Submitter, list(&["submitter"])),
            (
                C::Username,
                list(&["rightsHolder", "writePermission", "changePermission"]),
            ),
            (C::Taxon, list(&TAXON_RANKS)),
        ]);

        let facets = BTreeMap::from([
            (C::Creator, list(&["origin"])),
            (C::Attribute, list(&["attribute"])),
            (C::Annotation, list(&["sem_annotation"])),
            (C::Spatial, list(&["site"])),
            (C::Taxon, list(&TAXON_RANKS)),
            (C::All, list(&["keywords"])),
        ]);

        let labels = [
            (C::Attribute, "Data attribute"),
            (C::Documents, "Only results with data"),
            (C::Annotation, "Annotation"),
            (C::DataSource, "Data source"),
            (C::Creator, "Creator"),
            (C::DataYear, "Data coverage"),
            (C::PubYear, "Publish year"),
            (C::Id, "Identifier"),
            (C::SeriesId, "seriesId"),
            (C::Taxon, "Taxon"),
            (C::Spatial, "Location"),
            (C::All, ""),
        ]
        .into_iter()
        .map(|(c, l)| (c, l.to_string()))
        .collect();

        Self {
            fields,
            facets,
            labels,
        }
    }

    /// Returns the index fields queried for `category`.
    pub fn fields(&self, category: Category) -> Vec<&str> {
        match self.fields.get(&category) {
            Some(fields) if !fields.is_empty() => fields.iter().map(String::as_str).collect(),
            _ => vec![category.as_str()],
        }
    }

    /// Returns the first index field queried for `category`.
    pub fn field(&self, category: Category) -> &str {
        self.fields
            .get(&category)
            .and_then(|fields| fields.first())
            .map_or(category.as_str(), String::as_str)
    }

    /// Returns the facet fields for a facet name.
    ///
    /// Names that are categories with a facet mapping expand to the mapped
    /// fields; anything else is already an index field.
    pub fn facet_fields<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mapped = name
            .parse::<Category>()
            .ok()
            .and_then(|category| self.facets.get(&category))
            .filter(|fields| !fields.is_empty());
        match mapped {
            Some(fields) => fields.iter().map(String::as_str).collect(),
            None => vec![name],
        }
    }

    /// Returns the display label for `category`.
    pub fn label(&self, category: Category) -> &str {
        self.labels
            .get(&category)
            .map_or(category.as_str(), String::as_str)
    }

    /// Replaces the index fields for `category`.
    pub fn set_fields(&mut self, category: Category, fields: Vec<String>) {
        self.fields.insert(category, fields);
    }

    /// Replaces the facet fields for `category`.
    pub fn set_facets(&mut self, category: Category, fields: Vec<String>) {
        self.facets.insert(category, fields);
    }

    /// Replaces the display label for `category`.
    pub fn set_label(&mut self, category: Category, label: impl Into<String>) {
        self.labels.insert(category, label.into());
    }

    /// Returns the provenance fields requested with results.
    pub fn provenance_fields(&self) -> &'static [&'static str] {
        &PROVENANCE_FIELDS
    }

    /// Returns the provenance fields as a comma-separated field list.
    pub fn prov_field_list(&self) -> String {
        PROVENANCE_FIELDS.join(",")
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
