//! The mutable filter state of a search session.
//!
//! State is a map from [`Category`] to [`FilterSlot`], seeded from a
//! [`FilterDefaults`] table. A category the table does not contain is not
//! available in the deployment and can be neither set nor compiled.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::debug;

use crate::{
    Category, Exclusion, FilterDefaults, FilterSlot, FilterValue, GeohashGroups, StateError,
    geohash::group_geohashes, slot::check_shape,
};

/// Groups returned when the state holds none.
static NO_GROUPS: GeohashGroups = GeohashGroups::new();

/// Categories never reported as user filters.
const NOT_FILTERS: [Category; 2] = [Category::SortOrder, Category::ProvFields];

/// Current value of every filter category.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Table the state was seeded from and resets to.
    defaults: FilterDefaults,
    /// Current slot per available category.
    slots: BTreeMap<Category, FilterSlot>,
}

impl FilterState {
    /// Creates a state holding every default.
    pub fn new(defaults: FilterDefaults) -> Self {
        let slots = defaults.iter().map(|(c, s)| (c, s.clone())).collect();
        Self { defaults, slots }
    }

    /// Creates a state from defaults and a JSON state document.
    pub fn from_json(defaults: FilterDefaults, document: Value) -> Result<Self, StateError> {
        let mut state = Self::new(defaults);
        state.apply_json(document)?;
        Ok(state)
    }

    /// Returns the defaults table.
    pub fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }

    /// Returns every stored slot.
    pub fn slots(&self) -> &BTreeMap<Category, FilterSlot> {
        &self.slots
    }

    /// Returns true when `category` is part of this deployment.
    pub fn is_available(&self, category: Category) -> bool {
        self.defaults.contains(category)
    }

    /// Returns true when `name` is a recognized category available in this
    /// deployment.
    pub fn filter_is_available(&self, name: &str) -> bool {
        name.parse::<Category>()
            .is_ok_and(|category| self.is_available(category))
    }

    /// Returns an error unless `category` is available.
    fn ensure_available(&self, category: Category) -> Result<(), StateError> {
        if self.is_available(category) {
            Ok(())
        } else {
            Err(StateError::Unavailable(category))
        }
    }

    /// Returns the slot stored for `category`.
    pub fn get(&self, category: Category) -> Option<&FilterSlot> {
        self.slots.get(&category)
    }

    /// Replaces the value of `category`.
    ///
    /// Setting `geohashes` does not regroup the cells; call
    /// [`on_geohashes_changed`](Self::on_geohashes_changed) or use
    /// [`set_geohashes`](Self::set_geohashes).
    pub fn set(&mut self, category: Category, slot: FilterSlot) -> Result<(), StateError> {
        self.ensure_available(category)?;
        check_shape(category, &slot)?;
        self.slots.insert(category, slot);
        Ok(())
    }

    /// Replaces the value list of `category`.
    pub fn set_values<I, V>(&mut self, category: Category, values: I) -> Result<(), StateError>
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.set(category, FilterSlot::values(values))
    }

    /// Appends one value to `category`, turning a scalar slot into a list.
    pub fn push_value(
        &mut self,
        category: Category,
        value: impl Into<FilterValue>,
    ) -> Result<(), StateError> {
        self.ensure_available(category)?;
        let value = value.into();
        if let Some(FilterSlot::Values(values)) = self.slots.get_mut(&category) {
            values.push(value);
            return Ok(());
        }
        self.set(category, FilterSlot::Values(vec![value]))
    }

    /// Sets a boolean category.
    pub fn set_flag(&mut self, category: Category, value: bool) -> Result<(), StateError> {
        self.set(category, FilterSlot::Flag(value))
    }

    /// Sets both year range bounds.
    pub fn set_year_range(&mut self, min: i32, max: i32) -> Result<(), StateError> {
        self.set(Category::YearMin, FilterSlot::Number(f64::from(min)))?;
        self.set(Category::YearMax, FilterSlot::Number(f64::from(max)))
    }

    /// Returns the values of a list category, or nothing for other shapes.
    pub fn values(&self, category: Category) -> &[FilterValue] {
        match self.get(category) {
            Some(FilterSlot::Values(values)) => values,
            _ => &[],
        }
    }

    /// Returns true when a boolean category is set.
    pub fn flag(&self, category: Category) -> bool {
        matches!(self.get(category), Some(FilterSlot::Flag(true)))
    }

    /// Returns a numeric category.
    pub fn number(&self, category: Category) -> Option<f64> {
        match self.get(category) {
            Some(FilterSlot::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a string category.
    pub fn text(&self, category: Category) -> Option<&str> {
        match self.get(category) {
            Some(FilterSlot::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the exclusion list.
    pub fn exclusions(&self) -> &[Exclusion] {
        match self.get(Category::Exclude) {
            Some(FilterSlot::Exclusions(list)) => list,
            _ => &[],
        }
    }

    /// Returns the geohash cells currently selected.
    pub fn geohashes(&self) -> Vec<String> {
        self.values(Category::Geohashes)
            .iter()
            .map(|v| v.value().to_string())
            .collect()
    }

    /// Returns the aggregated geohash groups.
    pub fn geohash_groups(&self) -> &GeohashGroups {
        match self.get(Category::GeohashGroups) {
            Some(FilterSlot::Groups(groups)) => groups,
            _ => &NO_GROUPS,
        }
    }

    /// Replaces the geohash cells and regroups them.
    pub fn set_geohashes<I, V>(&mut self, hashes: I) -> Result<&GeohashGroups, StateError>
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.set_values(Category::Geohashes, hashes)?;
        Ok(self.on_geohashes_changed())
    }

    /// Recomputes the geohash groups from the current cells, replacing the
    /// previous groups in full.
    pub fn on_geohashes_changed(&mut self) -> &GeohashGroups {
        if self.is_available(Category::GeohashGroups) {
            let groups = group_geohashes(&self.geohashes());
            self.slots
                .insert(Category::GeohashGroups, FilterSlot::Groups(groups));
        }
        self.geohash_groups()
    }

    /// Returns true when the map filter has groups to query.
    pub fn has_geohash_filter(&self) -> bool {
        !self.geohash_groups().is_empty()
    }

    /// Restores the geohash cells, precision and groups to their defaults.
    pub fn reset_geohash(&mut self) {
        for category in [
            Category::Geohashes,
            Category::GeohashLevel,
            Category::GeohashGroups,
        ] {
            self.reset(category);
        }
    }

    /// Restores one category to its default.
    pub fn reset(&mut self, category: Category) {
        if let Some(slot) = self.defaults.get(category) {
            self.slots.insert(category, slot.clone());
        }
    }

    /// Restores every category to its default.
    pub fn clear(&mut self) {
        self.slots = self.defaults.iter().map(|(c, s)| (c, s.clone())).collect();
    }

    /// Returns true when `category` differs from its default.
    fn is_changed(&self, category: Category) -> bool {
        match (self.get(category), self.defaults.get(category)) {
            (Some(current), Some(default)) => current != default,
            _ => false,
        }
    }

    /// Returns true when `category` differs from its default and holds a usable
    /// value.
    pub fn is_active(&self, category: Category) -> bool {
        self.is_changed(category) && self.get(category).is_some_and(|s| !s.is_empty())
    }

    /// Returns every category the user has changed from its default.
    ///
    /// Sort order and provenance fields never count, and the map categories only
    /// count while the map filter is switched on.
    pub fn current_filters(&self) -> BTreeSet<Category> {
        let use_geohash = self.flag(Category::UseGeohash);
        self.slots
            .keys()
            .copied()
            .filter(|c| self.is_changed(*c))
            .filter(|c| !NOT_FILTERS.contains(c))
            .filter(|c| use_geohash || !c.is_spatial())
            .collect()
    }

    /// Returns the number of changed categories.
    pub fn filter_count(&self) -> usize {
        self.current_filters().len()
    }

    /// Removes `value` from `category`.
    ///
    /// List categories drop every matching element. Other categories return to
    /// their default. Clearing one of the year filters also resets the year
    /// range, unless the other year filter is still active.
    pub fn remove_from_model(&mut self, category: Category, value: &str) {
        if !self.is_available(category) {
            return;
        }
        match category {
            Category::PubYear | Category::DataYear => {
                let other = if category == Category::PubYear {
                    Category::DataYear
                } else {
                    Category::PubYear
                };
                let keep_range = self.is_active(other);
                self.reset(category);
                if !keep_range {
                    self.reset(Category::YearMin);
                    self.reset(Category::YearMax);
                }
            }
            _ => {
                match self.slots.get_mut(&category) {
                    Some(FilterSlot::Values(values)) => values.retain(|v| v.value() != value),
                    Some(FilterSlot::Exclusions(list)) => list.retain(|e| e.value != value),
                    _ => self.reset(category),
                }
                if category == Category::Geohashes {
                    self.on_geohashes_changed();
                }
            }
        }
    }

    /// Loads a JSON state document over the current state.
    ///
    /// Keys that are not categories, or not available here, are skipped. The
    /// geohash groups are always derived from the cells rather than loaded.
    pub fn apply_json(&mut self, document: Value) -> Result<(), StateError> {
        let Value::Object(entries) = document else {
            return Err(StateError::NotAnObject);
        };

        let mut regroup = false;
        for (key, value) in entries {
            let category = match key.parse::<Category>() {
                Ok(category) => category,
                Err(_) => {
                    debug!(key = %key, "skipping unknown state key");
                    continue;
                }
            };
            if !self.is_available(category) {
                debug!(%category, "skipping unavailable category");
                continue;
            }
            if category == Category::GeohashGroups {
                continue;
            }
            let slot = FilterSlot::from_json(category, value)?;
            self.set(category, slot)?;
            regroup |= category == Category::Geohashes;
        }

        if regroup {
            self.on_geohashes_changed();
        }
        Ok(())
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterDefaults::standard())
    }
}
