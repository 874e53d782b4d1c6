//! Geohash aggregation for the map filter.
//!
//! The map reports the geohash cells currently in view. Before querying, cells are
//! grouped by parent: a parent whose 32 children are all present is a complete
//! tile and can be queried as the parent cell itself, everything else is queried
//! cell by cell.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of child cells one geohash cell splits into.
pub const GEOHASH_BRANCHING: usize = 32;

/// Characters of the geohash base32 alphabet, in grid order.
pub const GEOHASH_ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// Geohashes at one precision level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeohashGroup {
    /// Hash length shared by every member.
    pub level: usize,
    /// True when the members are all 32 children of one parent cell.
    pub complete: bool,
    /// Sorted member hashes.
    pub hashes: Vec<String>,
}

impl GeohashGroup {
    /// Returns the precision key (`"6"` for six-character hashes).
    pub fn key(&self) -> String {
        self.level.to_string()
    }

    /// Returns the parent cell of a complete group.
    pub fn parent(&self) -> Option<&str> {
        if !self.complete || self.level < 2 {
            return None;
        }
        self.hashes.first().map(|h| parent_cell(h))
    }
}

/// The aggregated geohash groups stored in filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeohashGroups(Vec<GeohashGroup>);

impl GeohashGroups {
    /// An empty set of groups.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns true when there are no groups.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the groups: the incomplete bucket first, then complete tiles.
    pub fn iter(&self) -> impl Iterator<Item = &GeohashGroup> {
        self.0.iter()
    }

    /// Returns the bucket of cells that do not form complete tiles.
    pub fn incomplete(&self) -> Option<&GeohashGroup> {
        self.0.iter().find(|g| !g.complete)
    }

    /// Iterates over complete tiles.
    pub fn complete(&self) -> impl Iterator<Item = &GeohashGroup> {
        self.0.iter().filter(|g| g.complete)
    }

    /// Returns the distinct precision levels, lowest first.
    pub fn keys(&self) -> Vec<String> {
        let levels: BTreeSet<usize> = self.0.iter().map(|g| g.level).collect();
        levels.into_iter().map(|level| level.to_string()).collect()
    }

    /// Returns the hashes to query, keyed by the index level they are queried at.
    ///
    /// Complete tiles contribute their parent cell one level up.
    fn query_levels(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut levels: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for group in &self.0 {
            match group.parent() {
                Some(parent) => levels.entry(group.level - 1).or_default().push(parent),
                None => levels
                    .entry(group.level)
                    .or_default()
                    .extend(group.hashes.iter().map(String::as_str)),
            }
        }
        for hashes in levels.values_mut() {
            hashes.sort_unstable();
            hashes.dedup();
        }
        levels
    }
}

/// Returns `hash` without its last character.
fn parent_cell(hash: &str) -> &str {
    hash.char_indices().last().map_or("", |(idx, _)| &hash[..idx])
}

/// Groups geohashes into complete tiles and one bucket of leftovers.
pub fn group_geohashes(geohashes: &[String]) -> GeohashGroups {
    let mut sorted: Vec<&str> = geohashes
        .iter()
        .map(String::as_str)
        .filter(|h| !h.is_empty())
        .collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut by_parent: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for hash in sorted {
        by_parent.entry(parent_cell(hash)).or_default().push(hash);
    }

    let mut complete = Vec::new();
    let mut leftovers: Vec<String> = Vec::new();
    for members in by_parent.into_values() {
        if members.len() == GEOHASH_BRANCHING {
            complete.push(GeohashGroup {
                level: members[0].len(),
                complete: true,
                hashes: members.into_iter().map(str::to_string).collect(),
            });
        } else {
            leftovers.extend(members.into_iter().map(str::to_string));
        }
    }

    let mut groups = Vec::with_capacity(complete.len() + 1);
    if let Some(first) = leftovers.first() {
        groups.push(GeohashGroup {
            level: first.len(),
            complete: false,
            hashes: leftovers,
        });
    }
    groups.extend(complete);

    debug!(
        cells = geohashes.len(),
        groups = groups.len(),
        "recomputed geohash groups"
    );
    GeohashGroups(groups)
}

/// Length budget for a spatial clause appended to a partially built query.
#[derive(Debug, Clone, Copy)]
pub struct ClauseBudget {
    /// Length of the query text that precedes the spatial clause.
    pub offset: usize,
    /// Maximum query length before further cells are dropped.
    pub limit: usize,
}

/// A rendered spatial clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpatialClause {
    /// Clause text; empty when nothing fit.
    pub text: String,
    /// True when cells were dropped to respect the budget.
    pub truncated: bool,
}

/// Renders the geohash clause for the given groups.
///
/// Each query level becomes `geohash_<level>:h` or `geohash_<level>:(h1 OR h2)`,
/// levels are OR'd together and wrapped in parentheses when there is more than
/// one. With a budget, cells stop being appended once the running query length
/// exceeds the limit.
pub fn geohash_clause(groups: &GeohashGroups, budget: Option<ClauseBudget>) -> SpatialClause {
    let levels = groups.query_levels();
    let wrap = usize::from(levels.len() > 1);

    let mut parts: Vec<String> = Vec::with_capacity(levels.len());
    let mut built = 0;
    let mut truncated = false;

    for (level, hashes) in &levels {
        let header = format!("geohash_{level}:");
        let open = usize::from(hashes.len() > 1);
        let mut joined = String::new();
        let mut taken = 0;

        for hash in hashes {
            if let Some(budget) = budget {
                let running = budget.offset + wrap + built + header.len() + open + joined.len();
                if running > budget.limit {
                    truncated = true;
                    break;
                }
            }
            if taken > 0 {
                joined.push_str(" OR ");
            }
            joined.push_str(hash);
            taken += 1;
        }

        if taken > 0 {
            let part = if taken > 1 {
                format!("{header}({joined})")
            } else {
                format!("{header}{joined}")
            };
            built += part.len() + 4;
            parts.push(part);
        }
        if truncated {
            break;
        }
    }

    let text = match parts.len() {
        0 => String::new(),
        1 => parts.remove(0),
        _ => format!("({})", parts.join(" OR ")),
    };
    SpatialClause { text, truncated }
}
