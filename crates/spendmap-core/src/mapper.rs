//! Classification of transactions and interactive growth of the map

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::CoreResult;
use crate::mapping::CategoryMap;
use crate::models::Transaction;
use crate::prompt::{Answer, PromptRequest, Prompter};

/// What happened to one unknown description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Resolution {
    /// Filed under an existing or hinted category
    Assigned { description: String, category: String },
    /// Filed under a category created for it
    Created { description: String, category: String },
    /// Left unresolved, asked again next run
    Skipped { description: String, reason: String },
}

/// Outcome of one [`resolve_unknown`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub resolutions: Vec<Resolution>,
}

impl ResolutionReport {
    /// Number of descriptions now filed under a category
    pub fn resolved_count(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|r| !matches!(r, Resolution::Skipped { .. }))
            .count()
    }

    /// Descriptions left unresolved
    pub fn skipped(&self) -> Vec<&str> {
        self.resolutions
            .iter()
            .filter_map(|r| match r {
                Resolution::Skipped { description, .. } => Some(description.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Categories created during the run
    pub fn created_categories(&self) -> Vec<&str> {
        self.resolutions
            .iter()
            .filter_map(|r| match r {
                Resolution::Created { category, .. } => Some(category.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check if nothing was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped().is_empty()
    }
}

/// Owns a [`CategoryMap`] and applies it to transactions
#[derive(Debug, Clone, Default)]
pub struct CategoryMapper {
    map: CategoryMap,
}

impl CategoryMapper {
    pub fn new(map: CategoryMap) -> Self {
        Self { map }
    }

    /// Load the map at `path`, or start empty if the file does not exist
    ///
    /// Descriptions filed under several categories are logged; the first
    /// category alphabetically keeps winning until the file is fixed.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let map = if path.exists() {
            CategoryMap::load(path)?
        } else {
            log::info!("No category map at {}, starting empty", path.display());
            CategoryMap::new()
        };

        for ambiguity in map.ambiguities() {
            log::warn!(
                "'{}' is listed under {}; using '{}'",
                ambiguity.description,
                ambiguity.categories.join(", "),
                ambiguity.categories[0]
            );
        }

        Ok(Self { map })
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }

    pub fn into_map(self) -> CategoryMap {
        self.map
    }

    /// Assign every transaction the category its description is filed under
    ///
    /// Pure: existing categories on the input are ignored and unmatched
    /// transactions come back with `category = None`.
    pub fn categorize(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let index = self.map.index();
        transactions
            .iter()
            .map(|t| {
                let category = index.get(t.description.as_str()).map(|c| c.to_string());
                t.with_category(category)
            })
            .collect()
    }

    /// Unique descriptions with no category, in first-seen order
    pub fn unmapped(&self, transactions: &[Transaction]) -> Vec<String> {
        let index = self.map.index();
        let mut seen = HashSet::new();
        transactions
            .iter()
            .map(|t| t.description.as_str())
            .filter(|d| !index.contains_key(d) && seen.insert(*d))
            .map(str::to_string)
            .collect()
    }

    /// Run [`resolve_unknown`] against the owned map
    pub fn resolve_unknown(
        &mut self,
        descriptions: &[String],
        category_hints: &[String],
        prompter: &mut dyn Prompter,
    ) -> ResolutionReport {
        let map = std::mem::take(&mut self.map);
        let (map, report) = resolve_unknown(map, descriptions, category_hints, prompter);
        self.map = map;
        report
    }

    pub fn persist(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        self.map.persist(path)
    }
}

/// Ask `prompter` about every description the map does not know yet
///
/// Each unique description is asked about at most once, in input order.
/// Hints that are already categories are not offered again. Invalid or
/// unconfirmed answers leave the description unresolved.
pub fn resolve_unknown(
    mut map: CategoryMap,
    descriptions: &[String],
    category_hints: &[String],
    prompter: &mut dyn Prompter,
) -> (CategoryMap, ResolutionReport) {
    let mut report = ResolutionReport::default();
    let mut seen = HashSet::new();

    for description in descriptions {
        if !seen.insert(description.as_str()) || map.contains_description(description) {
            continue;
        }

        let categories = map.category_names();
        let mut hints: Vec<String> = category_hints
            .iter()
            .filter(|h| !map.contains_category(h))
            .cloned()
            .collect();
        hints.sort();
        hints.dedup();

        let request = PromptRequest {
            description,
            categories: &categories,
            hints: &hints,
        };
        let answer = prompter.ask(&request);
        let resolution = apply_answer(&mut map, description, answer, &categories, &hints, prompter);

        match &resolution {
            Resolution::Assigned { category, .. } => {
                log::info!("Filed '{}' under '{}'", description, category)
            }
            Resolution::Created { category, .. } => {
                log::info!("Created category '{}' for '{}'", category, description)
            }
            Resolution::Skipped { reason, .. } => {
                log::warn!("Skipping '{}' until next run: {}", description, reason)
            }
        }
        report.resolutions.push(resolution);
    }

    (map, report)
}

fn apply_answer(
    map: &mut CategoryMap,
    description: &str,
    answer: Answer,
    categories: &[String],
    hints: &[String],
    prompter: &mut dyn Prompter,
) -> Resolution {
    let skipped = |reason: String| Resolution::Skipped {
        description: description.to_string(),
        reason,
    };
    match answer {
        Answer::Index(i) => match categories.get(i) {
            Some(category) => assigned(map, category, description),
            None => skipped(format!("no category number {}", i)),
        },
        Answer::Hint(i) => match hints.get(i) {
            Some(category) => assigned(map, category, description),
            None => skipped(format!("no extra option number {}", i)),
        },
        Answer::Name(name) => {
            let name = name.trim();
            if name.is_empty() {
                skipped("empty category name".to_string())
            } else if categories.iter().chain(hints).any(|c| c == name) {
                assigned(map, name, description)
            } else if prompter.confirm_new_category(description, name) {
                map.assign(name, description);
                Resolution::Created {
                    description: description.to_string(),
                    category: name.to_string(),
                }
            } else {
                skipped(format!("'{}' is not a category", name))
            }
        }
        Answer::Skip => skipped("skipped by user".to_string()),
    }
}

fn assigned(map: &mut CategoryMap, category: &str, description: &str) -> Resolution {
    map.assign(category, description);
    Resolution::Assigned {
        description: description.to_string(),
        category: category.to_string(),
    }
}
