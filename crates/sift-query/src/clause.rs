//! Lucene clause fragments.
//!
//! Every value that reaches a query passes through [`format_value`]: it is
//! trimmed, percent-encoded when the query travels in a URL, wrapped in quotes or
//! wildcards, and has the characters Lucene treats as syntax escaped.

use std::{borrow::Cow, fmt, sync::LazyLock};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::FilterValue;

/// Characters `encodeURIComponent` leaves alone, besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Replacements applied by [`escape_special_char`], in order.
const ESCAPES: [(&str, &str); 8] = [
    ("%7B", "\\%7B"),
    ("%7D", "\\%7D"),
    ("%3A", "\\%3A"),
    (":", "\\:"),
    ("(", "\\("),
    (")", "\\)"),
    ("?", "\\?"),
    ("%3F", "\\%3F"),
];

/// An ISO 8601 timestamp anywhere in a value.
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d([+-][0-2]\d:[0-5]\d|Z)")
        .expect("valid date pattern")
});

/// An LDAP distinguished name such as `uid=jdoe,o=NCEAS,dc=ecoinformatics,dc=org`.
static LDAP_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(uid=|UID=|cn=|CN=).+([a-zA-Z]=).+([a-zA-Z]=).*").expect("valid LDAP pattern")
});

/// An ORCID URI.
static ORCID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^http://orcid\.org/[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9X]{4}")
        .expect("valid ORCID pattern")
});

/// How values are joined inside a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Any value matches.
    #[default]
    Or,
    /// Every value must match.
    And,
}

impl Operator {
    /// Returns the operator surrounded by spaces.
    fn separator(self) -> &'static str {
        match self {
            Self::Or => " OR ",
            Self::And => " AND ",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.separator().trim())
    }
}

/// How the compiled query travels to the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// In a URL: values are percent-encoded and quotes are `%22`.
    #[default]
    Url,
    /// In a request body: values are left as typed and quotes are `"`.
    Raw,
}

impl Encoding {
    /// Returns the quote character for this encoding.
    pub fn quote(self) -> &'static str {
        match self {
            Self::Url => "%22",
            Self::Raw => "\"",
        }
    }

    /// Encodes a value the way `encodeURIComponent` does, or not at all.
    pub fn encode(self, value: &str) -> Cow<'_, str> {
        match self {
            Self::Url => utf8_percent_encode(value, URI_COMPONENT).into(),
            Self::Raw => Cow::Borrowed(value),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Url => "url",
            Self::Raw => "raw",
        })
    }
}

/// Options for building a clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClauseOptions {
    /// Operator between values (and between fields in a multi-field query).
    pub operator: Operator,
    /// Wrap unquoted values in `*` wildcards to match substrings.
    pub subtext: bool,
    /// Quote every value regardless of content.
    pub force_quotes: bool,
    /// Value encoding.
    pub encoding: Encoding,
}

impl ClauseOptions {
    /// Returns default options for `encoding`.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    /// Sets the operator.
    #[must_use]
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Enables substring wildcards.
    #[must_use]
    pub fn subtext(mut self) -> Self {
        self.subtext = true;
        self
    }

    /// Quotes every value.
    #[must_use]
    pub fn force_quotes(mut self) -> Self {
        self.force_quotes = true;
        self
    }
}

/// Returns true when a value must be quoted to be searched as one term.
///
/// Values containing a timestamp are range bounds and are never quoted. Values
/// with spaces are phrases, and LDAP or ORCID subjects contain characters that
/// break a bare term.
pub fn needs_quotes(value: &str) -> bool {
    if ISO_DATE.is_match(value) {
        return false;
    }
    value.contains(' ') || LDAP_SUBJECT.is_match(value) || ORCID.is_match(value)
}

/// Backslash-escapes Lucene syntax characters, in raw and percent-encoded form.
pub fn escape_special_char(term: &str) -> String {
    let mut escaped = term.to_string();
    for (from, to) in ESCAPES {
        if escaped.contains(from) {
            escaped = escaped.replace(from, to);
        }
    }
    escaped
}

/// Encodes and escapes a value without quoting it.
pub fn encode_escaped(value: &str, encoding: Encoding) -> String {
    escape_special_char(&encoding.encode(value))
}

/// Formats one value for a clause, or returns `None` for a blank value.
pub fn format_value(value: &str, options: ClauseOptions) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let term = encode_escaped(value, options.encoding);
    let formatted = if options.force_quotes || needs_quotes(value) {
        let quote = options.encoding.quote();
        format!("{quote}{term}{quote}")
    } else if options.subtext {
        format!("*{term}*")
    } else {
        term
    };
    Some(formatted)
}

/// Formats every non-blank value.
fn format_values(values: &[FilterValue], options: ClauseOptions) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| format_value(v.value(), options))
        .collect()
}

/// Builds `field:value` or `field:(v1 OP v2 ...)`.
///
/// More than one field delegates to [`multi_field_query`]. Blank values are
/// dropped; nothing left yields an empty string.
pub fn grouped_query(fields: &[&str], values: &[FilterValue], options: ClauseOptions) -> String {
    if fields.len() > 1 {
        return multi_field_query(fields, values, options);
    }
    let Some(field) = fields.first() else {
        return String::new();
    };
    match format_values(values, options).as_slice() {
        [] => String::new(),
        [one] => format!("{field}:{one}"),
        many => format!("{field}:({})", many.join(options.operator.separator())),
    }
}

/// Builds `(f1:V OP f2:V ...)` where `V` is the value, or `(v1 OR v2 ...)`.
///
/// Searching an `id` field quotes every value. A single field delegates to
/// [`grouped_query`].
pub fn multi_field_query(
    fields: &[&str],
    values: &[FilterValue],
    options: ClauseOptions,
) -> String {
    if fields.len() < 2 {
        return grouped_query(fields, values, options);
    }
    let options = if fields.contains(&"id") {
        options.force_quotes()
    } else {
        options
    };
    let value = match format_values(values, options).as_slice() {
        [] => return String::new(),
        [one] => one.clone(),
        many => format!("({})", many.join(Operator::Or.separator())),
    };
    let clauses: Vec<String> = fields.iter().map(|f| format!("{f}:{value}")).collect();
    format!("({})", clauses.join(options.operator.separator()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[&str]) -> Vec<FilterValue> {
        raw.iter().map(|v| FilterValue::plain(*v)).collect()
    }

    #[test]
    fn quoting_rules() {
        assert!(needs_quotes("New York"));
        assert!(!needs_quotes("salmon"));
        assert!(!needs_quotes(""));
        assert!(!needs_quotes("2020-01-01T00:00:00Z"));
        assert!(!needs_quotes("[2001-01-01T00:00:00Z TO *]"));
        assert!(needs_quotes("uid=jdoe,o=NCEAS,dc=ecoinformatics,dc=org"));
        assert!(needs_quotes("http://orcid.org/0000-0002-1825-0097"));
        assert!(!needs_quotes("https://orcid.org/0000-0002-1825-0097"));
    }

    #[test]
    fn escape_order() {
        assert_eq!(escape_special_char("a:b"), "a\\:b");
        assert_eq!(escape_special_char("(x)?"), "\\(x\\)\\?");
        assert_eq!(escape_special_char("%7Bx%7D"), "\\%7Bx\\%7D");
        assert_eq!(escape_special_char("a%3Ab%3F"), "a\\%3Ab\\%3F");
        assert_eq!(escape_special_char("plain"), "plain");
    }

    /// Returns the query-syntax characters in `term` not preceded by a backslash.
    fn bare_specials(term: &str) -> Vec<char> {
        let mut bare = Vec::new();
        let mut escaped = false;
        for c in term.chars() {
            if !escaped && matches!(c, ':' | '(' | ')' | '?') {
                bare.push(c);
            }
            escaped = c == '\\' && !escaped;
        }
        bare
    }

    #[test]
    fn grouped_values_never_leak_query_syntax() {
        for (encoding, expected) in [
            (Encoding::Url, "a\\%3A\\(b\\)\\%3F"),
            (Encoding::Raw, "a\\:\\(b\\)\\?"),
        ] {
            let query = grouped_query(
                &["creator"],
                &values(&["a:(b)?"]),
                ClauseOptions::new(encoding),
            );
            let term = query.strip_prefix("creator:").unwrap();
            assert_eq!(term, expected, "{encoding}");
            assert!(bare_specials(term).is_empty(), "{encoding}: {query}");
        }
    }

    #[test]
    fn url_encoding_matches_uri_component() {
        assert_eq!(Encoding::Url.encode("Jane Doe"), "Jane%20Doe");
        assert_eq!(Encoding::Url.encode("a/b:c"), "a%2Fb%3Ac");
        assert_eq!(Encoding::Url.encode("*it's(ok)!~*"), "*it's(ok)!~*");
        assert_eq!(Encoding::Raw.encode("a/b:c"), "a/b:c");
    }

    #[test]
    fn single_quoted_value() {
        let query = grouped_query(&["creator"], &values(&["Jane Doe"]), ClauseOptions::default());
        assert_eq!(query, "creator:%22Jane%20Doe%22");
    }

    #[test]
    fn raw_quotes() {
        let query = grouped_query(
            &["creator"],
            &values(&["Jane Doe"]),
            ClauseOptions::new(Encoding::Raw),
        );
        assert_eq!(query, "creator:\"Jane Doe\"");
    }

    #[test]
    fn several_values() {
        let query = grouped_query(&["creator"], &values(&["Doe", "Smith"]), ClauseOptions::default());
        assert_eq!(query, "creator:(Doe OR Smith)");

        let query = grouped_query(
            &["siteText"],
            &values(&["Alaska", "Yukon"]),
            ClauseOptions::default().operator(Operator::And),
        );
        assert_eq!(query, "siteText:(Alaska AND Yukon)");
    }

    #[test]
    fn blank_values_are_dropped() {
        let opts = ClauseOptions::default();
        assert_eq!(grouped_query(&["creator"], &values(&[]), opts), "");
        assert_eq!(grouped_query(&["creator"], &values(&["  ", ""]), opts), "");
        assert_eq!(grouped_query(&["creator"], &values(&[" Doe ", ""]), opts), "creator:Doe");
    }

    #[test]
    fn described_values_are_unwrapped() {
        let described = vec![FilterValue::described("urn:node:KNB", "KNB", None)];
        let query = grouped_query(&["datasource"], &described, ClauseOptions::default());
        assert_eq!(query, "datasource:urn\\%3Anode\\%3AKNB");
    }

    #[test]
    fn subtext_wildcards() {
        let query = grouped_query(
            &["kingdom", "phylum"],
            &values(&["Pinus"]),
            ClauseOptions::default().subtext(),
        );
        assert_eq!(query, "(kingdom:*Pinus* OR phylum:*Pinus*)");
    }

    #[test]
    fn quoting_beats_wildcards() {
        let query = grouped_query(
            &["kingdom"],
            &values(&["Pinus contorta"]),
            ClauseOptions::default().subtext(),
        );
        assert_eq!(query, "kingdom:%22Pinus%20contorta%22");
    }

    #[test]
    fn multi_field_reuses_value_group() {
        let query = multi_field_query(
            &["rightsHolder", "submitter"],
            &values(&["a", "b"]),
            ClauseOptions::new(Encoding::Raw),
        );
        assert_eq!(query, "(rightsHolder:(a OR b) OR submitter:(a OR b))");
    }

    #[test]
    fn id_fields_force_quotes() {
        let query = multi_field_query(
            &["id", "seriesId"],
            &values(&["doi:10.5063/F1"]),
            ClauseOptions::new(Encoding::Raw).subtext(),
        );
        assert_eq!(query, "(id:\"doi\\:10.5063/F1\" OR seriesId:\"doi\\:10.5063/F1\")");
    }

    #[test]
    fn single_field_multi_delegates() {
        let opts = ClauseOptions::default();
        assert_eq!(
            multi_field_query(&["creator"], &values(&["Doe"]), opts),
            grouped_query(&["creator"], &values(&["Doe"]), opts)
        );
        assert_eq!(multi_field_query(&[], &values(&["Doe"]), opts), "");
    }
}
