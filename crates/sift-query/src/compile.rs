//! Compiling filter state into one Lucene query string.
//!
//! Categories are visited in a fixed order so the same state always yields the
//! same query, however it was built up. Each category contributes zero or more
//! clauses, and the clauses are joined with `AND`.

use std::{fmt, slice};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    Category, ClauseOptions, CompilerConfig, FieldCatalog, FilterSlot, FilterState, FilterValue,
    Operator,
    clause::{encode_escaped, format_value, grouped_query, multi_field_query},
    geohash::{ClauseBudget, geohash_clause},
};

/// Separator between top-level clauses.
const CLAUSE_SEPARATOR: &str = " AND ";

/// Categories compiled as one `field:value` clause per value.
const BASIC_FILTERS: [Category; 4] = [
    Category::Attribute,
    Category::FormatType,
    Category::RightsHolder,
    Category::Submitter,
];

/// A compiled query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    /// The query string; empty when no filter applies.
    pub text: String,
    /// True when map cells were dropped to keep the query short.
    pub truncated: bool,
}

impl CompiledQuery {
    /// Returns the query string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true when no filter applies.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compiles `state` with the given catalog and settings.
///
/// See [`QueryCompiler::compile`].
pub fn compile(
    state: &FilterState,
    catalog: &FieldCatalog,
    config: &CompilerConfig,
    scope: Option<Category>,
) -> CompiledQuery {
    QueryCompiler::new(catalog, config).compile(state, scope)
}

/// Turns filter state into query strings.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    /// Field names per category.
    catalog: &'a FieldCatalog,
    /// Deployment settings.
    config: &'a CompilerConfig,
}

/// Clauses gathered while compiling one state.
struct Pass<'s> {
    /// State being compiled.
    state: &'s FilterState,
    /// Only this category is compiled, when set.
    scope: Option<Category>,
    /// Clause options for the configured encoding.
    options: ClauseOptions,
    /// Non-empty clauses in order.
    clauses: Vec<String>,
}

impl<'s> Pass<'s> {
    /// Returns true when `category` should contribute to this pass.
    ///
    /// Without a scope only active categories count. A scope selects its
    /// category whenever it holds a value, including a default one.
    fn wants(&self, category: Category) -> bool {
        if !self.state.is_available(category) {
            return false;
        }
        match self.scope {
            None => self.state.is_active(category),
            Some(scope) => {
                scope == category && self.state.get(category).is_some_and(|s| !s.is_empty())
            }
        }
    }

    /// Records a clause, ignoring empty ones.
    fn push(&mut self, clause: String) {
        if !clause.is_empty() {
            self.clauses.push(clause);
        }
    }

    /// Returns the slot for `category`.
    fn slot(&self, category: Category) -> Option<&'s FilterSlot> {
        self.state.get(category)
    }

    /// Returns the length of the query built so far, plus the separator the
    /// next clause would need.
    fn query_len(&self) -> usize {
        if self.clauses.is_empty() {
            return 0;
        }
        let separators = CLAUSE_SEPARATOR.len() * self.clauses.len();
        self.clauses.iter().map(String::len).sum::<usize>() + separators
    }
}

impl<'a> QueryCompiler<'a> {
    /// Creates a compiler.
    pub fn new(catalog: &'a FieldCatalog, config: &'a CompilerConfig) -> Self {
        Self { catalog, config }
    }

    /// Compiles `state`, or only the `scope` category when given.
    ///
    /// Categories unavailable in the deployment are skipped. Compilation never
    /// fails: values that cannot be used contribute nothing.
    pub fn compile(&self, state: &FilterState, scope: Option<Category>) -> CompiledQuery {
        let mut pass = Pass {
            state,
            scope,
            options: ClauseOptions::new(self.config.encoding),
            clauses: Vec::new(),
        };

        self.annotation(&mut pass);
        self.identifier(&mut pass);
        for category in [Category::ResourceMap, Category::Documents] {
            self.id_list_or_flag(&mut pass, category);
        }
        for category in [Category::Username, Category::IdOnly] {
            self.any_field(&mut pass, category);
        }
        self.taxon(&mut pass);
        self.years(&mut pass);
        self.data_source(&mut pass);
        Self::exclude(&mut pass);
        Self::additional_criteria(&mut pass);
        Self::full_text(&mut pass);
        for category in BASIC_FILTERS {
            self.basic(&mut pass, category);
        }
        let truncated = self.geohash(&mut pass);
        for category in [Category::Spatial, Category::Creator] {
            self.all_values(&mut pass, category);
        }

        debug!(clauses = pass.clauses.len(), ?scope, "compiled query");
        CompiledQuery {
            text: pass.clauses.join(CLAUSE_SEPARATOR),
            truncated,
        }
    }

    /// Semantic annotations, always quoted.
    fn annotation(&self, pass: &mut Pass<'_>) {
        if !pass.wants(Category::Annotation) {
            return;
        }
        let values = pass.state.values(Category::Annotation);
        let clause = grouped_query(
            &[self.catalog.field(Category::Annotation)],
            values,
            pass.options.force_quotes(),
        );
        pass.push(clause);
    }

    /// Identifiers, matched as substrings across every identifier field.
    fn identifier(&self, pass: &mut Pass<'_>) {
        if !pass.wants(Category::Id) {
            return;
        }
        let clause = match pass.slot(Category::Id) {
            Some(FilterSlot::Values(values)) => grouped_query(
                &self.catalog.fields(Category::Id),
                values,
                pass.options.subtext(),
            ),
            Some(FilterSlot::Text(id)) if !id.trim().is_empty() => format!(
                "{}:*{}*",
                self.catalog.field(Category::Id),
                encode_escaped(id.trim(), pass.options.encoding)
            ),
            _ => String::new(),
        };
        pass.push(clause);
    }

    /// A list of ids, or a flag requiring the field to be present.
    fn id_list_or_flag(&self, pass: &mut Pass<'_>, category: Category) {
        if !pass.wants(category) {
            return;
        }
        let field = self.catalog.field(category);
        let clause = match pass.slot(category) {
            Some(FilterSlot::Values(values)) => grouped_query(&[field], values, pass.options),
            Some(FilterSlot::Flag(true)) => format!("{field}:*"),
            _ => String::new(),
        };
        pass.push(clause);
    }

    /// Values matched in any of the category's fields.
    fn any_field(&self, pass: &mut Pass<'_>, category: Category) {
        if !pass.wants(category) {
            return;
        }
        let clause = grouped_query(
            &self.catalog.fields(category),
            pass.state.values(category),
            pass.options.operator(Operator::Or),
        );
        pass.push(clause);
    }

    /// Each taxon term must match some rank.
    fn taxon(&self, pass: &mut Pass<'_>) {
        if !pass.wants(Category::Taxon) {
            return;
        }
        let fields = self.catalog.fields(Category::Taxon);
        let options = pass.options.subtext();
        let clause: String = pass
            .state
            .values(Category::Taxon)
            .iter()
            .map(|term| multi_field_query(&fields, slice::from_ref(term), options))
            .collect();
        pass.push(clause);
    }

    /// Publication year and temporal coverage ranges.
    fn years(&self, pass: &mut Pass<'_>) {
        let (Some(min), Some(max)) = (
            pass.state.number(Category::YearMin),
            pass.state.number(Category::YearMax),
        ) else {
            return;
        };

        if pass.wants(Category::PubYear) && pass.state.flag(Category::PubYear) {
            let range = format!("[{min}-01-01T00:00:00Z TO {max}-12-31T00:00:00Z]");
            let clauses: Vec<String> = self
                .catalog
                .fields(Category::PubYear)
                .iter()
                .map(|field| format!("{field}:{range}"))
                .collect();
            let clause = match clauses.as_slice() {
                [one] => one.clone(),
                _ => format!("({})", clauses.join(" OR ")),
            };
            pass.push(clause);
        }

        if pass.wants(Category::DataYear) && pass.state.flag(Category::DataYear) {
            let fields = self.catalog.fields(Category::DataYear);
            let (begin, end) = match fields.as_slice() {
                [begin, end, ..] => (*begin, *end),
                _ => ("beginDate", "endDate"),
            };
            pass.push(format!(
                "{begin}:[{min}-01-01T00:00:00Z TO *] AND {end}:[* TO {max}-12-31T00:00:00Z]"
            ));
        }
    }

    /// Data sources, described values first.
    fn data_source(&self, pass: &mut Pass<'_>) {
        if !pass.wants(Category::DataSource) {
            return;
        }
        let (mut merged, plain): (Vec<FilterValue>, Vec<FilterValue>) = pass
            .state
            .values(Category::DataSource)
            .iter()
            .cloned()
            .partition(FilterValue::is_described);
        merged.extend(plain);
        let clause = grouped_query(
            &[self.catalog.field(Category::DataSource)],
            &merged,
            pass.options,
        );
        pass.push(clause);
    }

    /// Negated field/value pairs.
    fn exclude(pass: &mut Pass<'_>) {
        if !pass.wants(Category::Exclude) {
            return;
        }
        let state = pass.state;
        for exclusion in state.exclusions() {
            if let Some(value) = format_value(&exclusion.value, pass.options) {
                pass.push(format!(" -{}:{value}", exclusion.field));
            }
        }
    }

    /// Raw query fragments.
    fn additional_criteria(pass: &mut Pass<'_>) {
        if !pass.wants(Category::AdditionalCriteria) {
            return;
        }
        let state = pass.state;
        for criterion in state.values(Category::AdditionalCriteria) {
            let criterion = criterion.value().trim();
            if !criterion.is_empty() {
                pass.push(encode_escaped(criterion, pass.options.encoding));
            }
        }
    }

    /// Full-text terms with no field prefix.
    fn full_text(pass: &mut Pass<'_>) {
        if !pass.wants(Category::All) {
            return;
        }
        let state = pass.state;
        for term in state.values(Category::All) {
            if let Some(term) = format_value(term.value(), pass.options) {
                pass.push(term);
            }
        }
    }

    /// One `field:value` clause per value.
    fn basic(&self, pass: &mut Pass<'_>, category: Category) {
        if !pass.wants(category) {
            return;
        }
        let field = self.catalog.field(category);
        let state = pass.state;
        for value in state.values(category) {
            if let Some(value) = format_value(value.value(), pass.options) {
                pass.push(format!("{field}:{value}"));
            }
        }
    }

    /// The map filter. Returns true when cells were dropped.
    fn geohash(&self, pass: &mut Pass<'_>) -> bool {
        if !self.config.spatial_enabled
            || !pass.wants(Category::Geohashes)
            || !pass.state.flag(Category::UseGeohash)
            || !pass.state.has_geohash_filter()
        {
            return false;
        }

        let budget = self.config.disable_query_posts.then(|| ClauseBudget {
            offset: pass.query_len(),
            limit: self.config.geohash_query_limit,
        });
        let clause = geohash_clause(pass.state.geohash_groups(), budget);
        if clause.truncated {
            warn!(
                limit = self.config.geohash_query_limit,
                "geohash filter truncated to keep the query within the GET length limit"
            );
        }
        pass.push(clause.text);
        clause.truncated
    }

    /// Every value must match.
    fn all_values(&self, pass: &mut Pass<'_>, category: Category) {
        if !pass.wants(category) {
            return;
        }
        let clause = match pass.slot(category) {
            Some(FilterSlot::Values(values)) => grouped_query(
                &self.catalog.fields(category),
                values,
                pass.options.operator(Operator::And),
            ),
            Some(FilterSlot::Text(text)) => format_value(text, pass.options)
                .map(|value| format!("{}:{value}", self.catalog.field(category)))
                .unwrap_or_default(),
            _ => String::new(),
        };
        pass.push(clause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoding, FilterDefaults};

    fn fresh() -> FilterState {
        FilterState::new(FilterDefaults::for_year(2024))
    }

    fn run(state: &FilterState) -> String {
        compile(state, &FieldCatalog::standard(), &CompilerConfig::default(), None).text
    }

    #[test]
    fn empty_state_compiles_to_nothing() {
        assert_eq!(run(&fresh()), "");
    }

    #[test]
    fn annotations_are_quoted() {
        let mut state = fresh();
        state
            .set_values(Category::Annotation, ["http://purl.dataone.org/odo/ECSO_1"])
            .unwrap();
        assert_eq!(
            run(&state),
            "sem_annotation:%22http\\%3A%2F%2Fpurl.dataone.org%2Fodo%2FECSO_1%22"
        );
    }

    #[test]
    fn scalar_identifier() {
        let mut state = fresh();
        state
            .set(Category::Id, FilterSlot::Text("urn:uuid:1".into()))
            .unwrap();
        assert_eq!(run(&state), "id:*urn\\%3Auuid\\%3A1*");
    }

    #[test]
    fn identifier_list_is_quoted_across_fields() {
        let mut state = fresh();
        state.set_values(Category::Id, ["abc"]).unwrap();
        assert_eq!(
            run(&state),
            "(id:%22abc%22 OR identifier:%22abc%22 OR documents:%22abc%22 \
             OR resourceMap:%22abc%22 OR seriesId:%22abc%22)"
        );
    }

    #[test]
    fn documents_flag() {
        let mut state = fresh();
        state.set_flag(Category::Documents, true).unwrap();
        assert_eq!(run(&state), "documents:*");
    }

    #[test]
    fn taxon_terms_concatenate() {
        let mut state = fresh();
        state.set_values(Category::Taxon, ["Pinus", "Quercus"]).unwrap();
        let query = run(&state);
        assert!(query.starts_with("(kingdom:*Pinus* OR phylum:*Pinus*"));
        assert!(query.contains("species:*Pinus*)(kingdom:*Quercus*"));
    }

    #[test]
    fn publication_years() {
        let mut state = fresh();
        state.set_year_range(1990, 2000).unwrap();
        state.set_flag(Category::PubYear, true).unwrap();
        let compiler_config = CompilerConfig::default();
        let catalog = FieldCatalog::standard();
        let query = compile(&state, &catalog, &compiler_config, Some(Category::PubYear));
        assert_eq!(
            query.text,
            "(datePublished:[1990-01-01T00:00:00Z TO 2000-12-31T00:00:00Z] \
             OR dateUploaded:[1990-01-01T00:00:00Z TO 2000-12-31T00:00:00Z])"
        );
    }

    #[test]
    fn data_years() {
        let mut state = fresh();
        state.set_year_range(1990, 2000).unwrap();
        state.set_flag(Category::DataYear, true).unwrap();
        let query = compile(
            &state,
            &FieldCatalog::standard(),
            &CompilerConfig::default(),
            Some(Category::DataYear),
        );
        assert_eq!(
            query.text,
            "beginDate:[1990-01-01T00:00:00Z TO *] AND endDate:[* TO 2000-12-31T00:00:00Z]"
        );
    }

    #[test]
    fn data_source_puts_described_values_first() {
        let mut state = fresh();
        state
            .set(
                Category::DataSource,
                FilterSlot::Values(vec![
                    FilterValue::plain("urn:node:A"),
                    FilterValue::described("urn:node:B", "B", None),
                ]),
            )
            .unwrap();
        let config = CompilerConfig {
            encoding: Encoding::Raw,
            ..CompilerConfig::default()
        };
        let query = compile(&state, &FieldCatalog::standard(), &config, None);
        assert_eq!(query.text, "datasource:(urn\\:node\\:B OR urn\\:node\\:A)");
    }

    #[test]
    fn scope_compiles_default_base_filters() {
        let state = fresh();
        let catalog = FieldCatalog::standard();
        let config = CompilerConfig::default();
        assert_eq!(
            compile(&state, &catalog, &config, Some(Category::FormatType)).text,
            "formatType:METADATA"
        );
        assert_eq!(
            compile(&state, &catalog, &config, Some(Category::Exclude)).text,
            " -obsoletedBy:* AND  -formatId:*dataone.org%2Fcollections* \
             AND  -formatId:*dataone.org%2Fportals*"
        );
    }

    #[test]
    fn scope_skips_other_categories() {
        let mut state = fresh();
        state.set_values(Category::All, ["salmon"]).unwrap();
        state.set_values(Category::Creator, ["Kibele"]).unwrap();
        let query = compile(
            &state,
            &FieldCatalog::standard(),
            &CompilerConfig::default(),
            Some(Category::Creator),
        );
        assert_eq!(query.text, "originText:Kibele");
    }

    #[test]
    fn creator_values_are_and_grouped() {
        let mut state = fresh();
        state.set_values(Category::Creator, ["Doe", "Smith"]).unwrap();
        assert_eq!(run(&state), "originText:(Doe AND Smith)");
    }

    #[test]
    fn additional_criteria_are_not_field_qualified() {
        let mut state = fresh();
        state
            .set_values(Category::AdditionalCriteria, ["isPublic:true"])
            .unwrap();
        assert_eq!(run(&state), "isPublic\\%3Atrue");
    }

    #[test]
    fn geohash_needs_map_enabled() {
        let mut state = fresh();
        state.set_geohashes(["9q8yy"]).unwrap();
        assert_eq!(run(&state), "geohash_5:9q8yy");

        let config = CompilerConfig {
            spatial_enabled: false,
            ..CompilerConfig::default()
        };
        assert!(compile(&state, &FieldCatalog::standard(), &config, None).is_empty());

        state.set_flag(Category::UseGeohash, false).unwrap();
        assert_eq!(run(&state), "");
    }

    #[test]
    fn unavailable_categories_are_skipped() {
        let defaults = FilterDefaults::for_year(2024).without(&[Category::Annotation]);
        let mut state = FilterState::new(FilterDefaults::for_year(2024));
        state
            .set_values(Category::Annotation, ["http://example.org/a"])
            .unwrap();
        state.set_values(Category::All, ["salmon"]).unwrap();

        let mut gated = FilterState::new(defaults);
        gated.set_values(Category::All, ["salmon"]).unwrap();
        assert_eq!(run(&gated), "salmon");
        assert!(run(&state).starts_with("sem_annotation:"));
    }
}
