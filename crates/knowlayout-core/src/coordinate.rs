//! View coordinates and their calculators.
//!
//! A [`ViewCoordinate`] describes how domain data is looked at: which stamp
//! path and statuses are visible, which language descriptions are preferred,
//! which classifier results are used and how the taxonomy is navigated. The
//! coordinate itself is an opaque value to the layout layer; it is stored
//! whole and compared structurally.
//!
//! A [`ViewCalculator`] is derived from a coordinate. Calculators are cached
//! by coordinate value in a [`CalculatorCache`], so contexts with equal
//! coordinates share one calculator.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::keys::PreferenceValue;
use crate::preferences::StoredValue;

/// Stamp paths offered when changing the stamp coordinate.
pub const STAMP_PATHS: &[&str] = &["development", "master", "primordial"];

/// Languages offered when changing the language coordinate.
pub const LANGUAGES: &[&str] = &["en", "es", "fr", "de"];

/// Classifiers offered when changing the logic coordinate.
pub const CLASSIFIERS: &[&str] = &["snorocket", "elk"];

/// Which component statuses a stamp filter admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StatusSet {
    #[default]
    Active,
    ActiveAndInactive,
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSet::Active => write!(f, "active"),
            StatusSet::ActiveAndInactive => write!(f, "active and inactive"),
        }
    }
}

/// Stated or inferred axioms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PremiseType {
    Stated,
    #[default]
    Inferred,
}

impl fmt::Display for PremiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremiseType::Stated => write!(f, "stated"),
            PremiseType::Inferred => write!(f, "inferred"),
        }
    }
}

/// Version filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StampCoordinate {
    /// Development path the view follows.
    pub path: String,
    /// Statuses admitted by the filter.
    pub allowed_states: StatusSet,
}

impl Default for StampCoordinate {
    fn default() -> Self {
        Self {
            path: STAMP_PATHS[0].to_string(),
            allowed_states: StatusSet::Active,
        }
    }
}

/// Description preferences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageCoordinate {
    /// ISO language code.
    pub language: String,
    /// Description types in priority order.
    pub description_types: Vec<String>,
}

impl Default for LanguageCoordinate {
    fn default() -> Self {
        Self {
            language: LANGUAGES[0].to_string(),
            description_types: vec!["regular name".to_string(), "fully qualified name".to_string()],
        }
    }
}

/// Classifier selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicCoordinate {
    /// Classifier whose results are used.
    pub classifier: String,
    /// Premise used for logical definitions.
    pub premise: PremiseType,
}

impl Default for LogicCoordinate {
    fn default() -> Self {
        Self {
            classifier: CLASSIFIERS[0].to_string(),
            premise: PremiseType::Inferred,
        }
    }
}

/// Taxonomy navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NavigationCoordinate {
    /// Premise used to compute parents and children.
    pub premise: PremiseType,
    /// Whether siblings are sorted by description.
    pub sort_vertices: bool,
}

/// Complete description of how to look at domain data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewCoordinate {
    /// Version filter.
    pub stamp: StampCoordinate,
    /// Description preferences.
    pub language: LanguageCoordinate,
    /// Classifier selection.
    pub logic: LogicCoordinate,
    /// Taxonomy navigation.
    pub navigation: NavigationCoordinate,
}

impl StoredValue for ViewCoordinate {
    const TYPE_NAME: &'static str = "ViewCoordinate";

    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Object(object) => serde_json::from_value(object.clone()).ok(),
            _ => None,
        }
    }
}

/// A single edit to a view coordinate, as offered by the view menu.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateChange {
    /// Follow another stamp path.
    StampPath(String),
    /// Admit a different status set.
    AllowedStates(StatusSet),
    /// Prefer descriptions in another language.
    Language(String),
    /// Use another classifier.
    Classifier(String),
    /// Switch the logic premise.
    LogicPremise(PremiseType),
    /// Switch the navigation premise.
    NavigationPremise(PremiseType),
    /// Toggle sorting of taxonomy siblings.
    SortVertices(bool),
    /// Return to the default coordinate.
    Reset,
}

impl CoordinateChange {
    /// Produce the coordinate that results from applying this change.
    pub fn apply(&self, coordinate: &ViewCoordinate) -> ViewCoordinate {
        let mut next = coordinate.clone();
        match self {
            CoordinateChange::StampPath(path) => next.stamp.path = path.clone(),
            CoordinateChange::AllowedStates(states) => next.stamp.allowed_states = *states,
            CoordinateChange::Language(language) => next.language.language = language.clone(),
            CoordinateChange::Classifier(classifier) => {
                next.logic.classifier = classifier.clone()
            }
            CoordinateChange::LogicPremise(premise) => next.logic.premise = *premise,
            CoordinateChange::NavigationPremise(premise) => next.navigation.premise = *premise,
            CoordinateChange::SortVertices(sort) => next.navigation.sort_vertices = *sort,
            CoordinateChange::Reset => next = ViewCoordinate::default(),
        }
        next
    }
}

/// Derived, read-only view over domain data for one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCalculator {
    coordinate: ViewCoordinate,
}

impl ViewCalculator {
    /// Derive a calculator from a coordinate
    pub fn new(coordinate: ViewCoordinate) -> Self {
        Self { coordinate }
    }

    /// Coordinate this calculator was derived from
    pub fn coordinate(&self) -> &ViewCoordinate {
        &self.coordinate
    }

    pub fn stamp_summary(&self) -> String {
        format!(
            "{} path, {}",
            self.coordinate.stamp.path, self.coordinate.stamp.allowed_states
        )
    }

    pub fn language_summary(&self) -> String {
        let language = &self.coordinate.language;
        match language.description_types.first() {
            Some(first) => format!("{} {}", language.language, first),
            None => language.language.clone(),
        }
    }

    pub fn logic_summary(&self) -> String {
        format!(
            "{} ({})",
            self.coordinate.logic.classifier, self.coordinate.logic.premise
        )
    }

    pub fn navigation_summary(&self) -> String {
        let sort = if self.coordinate.navigation.sort_vertices {
            "sorted"
        } else {
            "unsorted"
        };
        format!("{} {}", self.coordinate.navigation.premise, sort)
    }

    /// One line summary of the whole coordinate
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.stamp_summary(),
            self.language_summary(),
            self.logic_summary(),
            self.navigation_summary()
        )
    }

    /// Describe a component as this view would show it
    pub fn describe_component(&self, component: &str) -> String {
        format!(
            "{} [{}] on {}",
            component, self.coordinate.language.language, self.coordinate.stamp.path
        )
    }
}

/// Calculators shared by coordinate value.
///
/// Cloning the cache shares the underlying map, so one cache can be handed
/// to every context and to background menu tasks. Calculators nobody holds
/// any more are dropped whenever a new one is derived.
#[derive(Debug, Clone, Default)]
pub struct CalculatorCache {
    entries: Arc<RwLock<HashMap<ViewCoordinate, Arc<ViewCalculator>>>>,
}

impl CalculatorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the calculator for a coordinate, deriving it on first use
    pub fn get_or_create(&self, coordinate: &ViewCoordinate) -> Arc<ViewCalculator> {
        if let Some(existing) = self.entries.read().get(coordinate) {
            return existing.clone();
        }
        let mut entries = self.entries.write();
        entries.retain(|cached, calculator| {
            cached == coordinate || Arc::strong_count(calculator) > 1
        });
        entries
            .entry(coordinate.clone())
            .or_insert_with(|| {
                tracing::debug!(language = %coordinate.language.language, "deriving view calculator");
                Arc::new(ViewCalculator::new(coordinate.clone()))
            })
            .clone()
    }

    /// Number of distinct coordinates with a calculator
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_coordinates_share_a_calculator() {
        let cache = CalculatorCache::new();
        let a = cache.get_or_create(&ViewCoordinate::default());
        let b = cache.get_or_create(&ViewCoordinate::default());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let spanish = CoordinateChange::Language("es".to_string()).apply(&ViewCoordinate::default());
        let c = cache.get_or_create(&spanish);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unheld_calculators_are_evicted() {
        let cache = CalculatorCache::new();
        let held = cache.get_or_create(&ViewCoordinate::default());
        let master = CoordinateChange::StampPath("master".to_string()).apply(&ViewCoordinate::default());
        drop(cache.get_or_create(&master));
        assert_eq!(cache.len(), 2);

        let german = CoordinateChange::Language("de".to_string()).apply(&ViewCoordinate::default());
        let _german = cache.get_or_create(&german);
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&held, &cache.get_or_create(&ViewCoordinate::default())));
    }

    #[test]
    fn test_coordinate_change_apply() {
        let base = ViewCoordinate::default();
        let changed = CoordinateChange::StampPath("master".to_string()).apply(&base);
        assert_eq!(changed.stamp.path, "master");
        assert_eq!(changed.language, base.language);

        let reset = CoordinateChange::Reset.apply(&changed);
        assert_eq!(reset, ViewCoordinate::default());
    }

    #[test]
    fn test_stored_value_falls_back_on_garbage() {
        assert_eq!(ViewCoordinate::decode("not json"), None);
        let partial = ViewCoordinate::decode(r#"{"stamp":{"path":"master"}}"#)
            .expect("partial coordinate decodes with defaults");
        assert_eq!(partial.stamp.path, "master");
        assert_eq!(partial.language, LanguageCoordinate::default());
    }

    #[test]
    fn test_calculator_descriptions() {
        let calculator = ViewCalculator::new(ViewCoordinate::default());
        assert_eq!(calculator.describe_component("Heart"), "Heart [en] on development");
        assert!(calculator.summary().contains("snorocket (inferred)"));
    }
}
