//! The persisted description → category dictionary
//!
//! On disk the map is a YAML document with one category per line, sorted
//! by name:
//!
//! ```text
//! "Groceries": ["TRADER JOE'S", "WHOLE FOODS"]
//! "Income": ["PAYROLL"]
//! ```
//!
//! Keys and descriptions are JSON-quoted so any bank description survives
//! the round trip, and adding a description only touches its category's
//! line.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

const HEADER: &str = "# spendmap category mappings: \"Category\": [descriptions]\n";

/// A description filed under more than one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub description: String,
    /// All categories listing the description; the first one wins
    pub categories: Vec<String>,
}

/// Ordered mapping from category name to the descriptions filed under it
///
/// Iteration is alphabetical by category. When a description appears under
/// several categories, lookups return the first one in that order; use
/// [`CategoryMap::ambiguities`] to find such entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap {
    categories: BTreeMap<String, Vec<String>>,
}

impl CategoryMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of categories, including empty ones
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of description entries
    pub fn description_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Category names in iteration order
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Iterate over `(category, descriptions)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Descriptions filed under `category`
    pub fn descriptions(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Category of an exact, case-sensitive description match
    pub fn lookup(&self, description: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, descriptions)| descriptions.iter().any(|d| d == description))
            .map(|(category, _)| category.as_str())
    }

    pub fn contains_description(&self, description: &str) -> bool {
        self.lookup(description).is_some()
    }

    /// Add a category with no descriptions yet
    pub fn insert_category(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if self.categories.contains_key(&category) {
            return false;
        }
        self.categories.insert(category, Vec::new());
        true
    }

    /// File `description` under `category`, creating the category if needed
    ///
    /// Returns `false` when the description was already listed there.
    pub fn assign(&mut self, category: impl Into<String>, description: impl Into<String>) -> bool {
        let description = description.into();
        let entry = self.categories.entry(category.into()).or_default();
        if entry.contains(&description) {
            return false;
        }
        entry.push(description);
        true
    }

    /// Descriptions listed under more than one category
    pub fn ambiguities(&self) -> Vec<Ambiguity> {
        let mut seen: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (category, descriptions) in &self.categories {
            for description in descriptions {
                let owners = seen.entry(description.as_str()).or_default();
                if !owners.contains(category) {
                    owners.push(category.clone());
                }
            }
        }
        seen.into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(description, categories)| Ambiguity {
                description: description.to_string(),
                categories,
            })
            .collect()
    }

    /// Copy without empty categories, as it would be persisted
    pub fn normalized(&self) -> Self {
        Self {
            categories: self
                .categories
                .iter()
                .filter(|(_, descriptions)| !descriptions.is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Build a lookup table from description to category
    ///
    /// Ambiguous descriptions keep their first category.
    pub fn index(&self) -> HashMap<&str, &str> {
        let mut index = HashMap::new();
        for (category, descriptions) in &self.categories {
            for description in descriptions {
                index.entry(description.as_str()).or_insert(category.as_str());
            }
        }
        index
    }

    // ==================== Persistence ====================

    /// Render the persisted text form
    pub fn to_persisted_string(&self) -> String {
        let mut out = String::from(HEADER);
        for (category, descriptions) in &self.categories {
            if descriptions.is_empty() {
                continue;
            }
            // Serializing strings to JSON cannot fail
            let key = serde_json::to_string(category).unwrap_or_default();
            let values: Vec<String> = descriptions
                .iter()
                .map(|d| serde_json::to_string(d).unwrap_or_default())
                .collect();
            out.push_str(&key);
            out.push_str(": [");
            out.push_str(&values.join(", "));
            out.push_str("]\n");
        }
        out
    }

    /// Parse the persisted text form
    ///
    /// Any YAML mapping of names to string lists is accepted, so hand-edited
    /// block-style files load as well. Ambiguities are not rejected here.
    pub fn from_persisted_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let blank = content
            .lines()
            .map(str::trim)
            .all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return Ok(Self::new());
        }

        let raw: Option<BTreeMap<String, Option<Vec<String>>>> = serde_yaml::from_str(content)?;
        let categories = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(category, descriptions)| {
                let mut unique: Vec<String> = Vec::new();
                for d in descriptions.unwrap_or_default() {
                    if !unique.contains(&d) {
                        unique.push(d);
                    }
                }
                (category, unique)
            })
            .collect();
        Ok(Self { categories })
    }

    /// Load a persisted map
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let map = Self::from_persisted_str(&content).map_err(|e| CoreError::ConfigError {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
        log::info!(
            "Loaded {} categories ({} descriptions) from {}",
            map.len(),
            map.description_count(),
            path.display()
        );
        Ok(map)
    }

    /// Write the map atomically, sorted and without empty categories
    pub fn persist(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        spendmap_utils::atomic_write(path, self.to_persisted_string().as_bytes())
            .map_err(|e| CoreError::io(path, e))?;
        log::info!("Saved {} categories to {}", self.normalized().len(), path.display());
        Ok(())
    }
}

impl<C, D> FromIterator<(C, D)> for CategoryMap
where
    C: Into<String>,
    D: IntoIterator,
    D::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, D)>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for (category, descriptions) in iter {
            let category = category.into();
            map.insert_category(category.clone());
            for description in descriptions {
                map.assign(category.clone(), description);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategoryMap {
        CategoryMap::from_iter([
            ("Income", vec!["PAYROLL"]),
            ("Groceries", vec!["WHOLE FOODS", "TRADER JOE'S"]),
        ])
    }

    #[test]
    fn test_lookup_exact_case_sensitive() {
        let map = sample();
        assert_eq!(map.lookup("WHOLE FOODS"), Some("Groceries"));
        assert_eq!(map.lookup("whole foods"), None);
        assert_eq!(map.lookup("WHOLE"), None);
        assert_eq!(map.lookup("PAYROLL"), Some("Income"));
    }

    #[test]
    fn test_iteration_is_alphabetical() {
        let map = sample();
        assert_eq!(map.category_names(), vec!["Groceries".to_string(), "Income".to_string()]);
    }

    #[test]
    fn test_assign_creates_and_dedups() {
        let mut map = CategoryMap::new();
        assert!(map.assign("Cash", "ATM WITHDRAWAL"));
        assert!(!map.assign("Cash", "ATM WITHDRAWAL"));
        assert_eq!(map.descriptions("Cash").unwrap().len(), 1);
        assert!(map.insert_category("Travel"));
        assert!(!map.insert_category("Travel"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ambiguous_description_first_key_wins() {
        let mut map = sample();
        map.assign("Dining", "WHOLE FOODS");

        assert_eq!(map.lookup("WHOLE FOODS"), Some("Dining"));
        assert_eq!(map.index().get("WHOLE FOODS"), Some(&"Dining"));

        let ambiguities = map.ambiguities();
        assert_eq!(ambiguities.len(), 1);
        assert_eq!(ambiguities[0].description, "WHOLE FOODS");
        assert_eq!(
            ambiguities[0].categories,
            vec!["Dining".to_string(), "Groceries".to_string()]
        );
        assert!(sample().ambiguities().is_empty());
    }

    #[test]
    fn test_persisted_layout() {
        let mut map = sample();
        map.insert_category("Empty");
        let text = map.to_persisted_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[1], r#""Groceries": ["WHOLE FOODS", "TRADER JOE'S"]"#);
        assert_eq!(lines[2], r#""Income": ["PAYROLL"]"#);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_round_trip_drops_empty_categories() {
        let mut map = sample();
        map.insert_category("Empty");
        map.assign("Odd: \"quoted\"", "CAFÉ #12, \"LE\" BISTRO");

        let reloaded = CategoryMap::from_persisted_str(&map.to_persisted_string()).unwrap();
        assert_eq!(reloaded, map.normalized());
        assert!(!reloaded.contains_category("Empty"));
        assert_eq!(
            reloaded.lookup("CAFÉ #12, \"LE\" BISTRO"),
            Some("Odd: \"quoted\"")
        );
    }

    #[test]
    fn test_round_trip_keeps_quote_comma_inside_description() {
        let map = CategoryMap::from_iter([("Shops", vec!["SHOP \"X\",", "OTHER", "A\",\"B"])]);
        let text = map.to_persisted_string();
        assert!(text.contains(r#""Shops": ["SHOP \"X\",", "OTHER", "A\",\"B"]"#));

        let reloaded = CategoryMap::from_persisted_str(&text).unwrap();
        assert_eq!(reloaded, map.normalized());
        assert_eq!(reloaded.lookup("SHOP \"X\","), Some("Shops"));
        assert_eq!(reloaded.lookup("A\",\"B"), Some("Shops"));
    }

    #[test]
    fn test_hand_edited_block_style_loads() {
        let text = "Groceries:\n  - WHOLE FOODS\n  - WHOLE FOODS\nTravel:\n";
        let map = CategoryMap::from_persisted_str(text).unwrap();
        assert_eq!(map.descriptions("Groceries").unwrap(), ["WHOLE FOODS".to_string()]);
        assert_eq!(map.descriptions("Travel").unwrap().len(), 0);
    }

    #[test]
    fn test_empty_document_is_empty_map() {
        assert!(CategoryMap::from_persisted_str("").unwrap().is_empty());
        assert!(CategoryMap::from_persisted_str("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(CategoryMap::from_persisted_str("- a\n- b\n").is_err());
        assert!(CategoryMap::from_persisted_str("Groceries: {a: 1}\n").is_err());
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("category_mappings.yaml");
        std::fs::write(&path, "Groceries: \"WHOLE FOODS\"\n").unwrap();

        let err = CategoryMap::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigError { .. }));
    }

    #[test]
    fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("category_mappings.yaml");

        let map = sample();
        map.persist(&path).unwrap();
        let loaded = CategoryMap::load(&path).unwrap();

        assert_eq!(loaded, map);
        assert_eq!(loaded.description_count(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CategoryMap::load(dir.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound { .. }));
    }
}
