//! Criteria table: the ordered set of prompt definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// One matchable prompt definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCriteria {
    /// Unique prompt identifier returned to callers (e.g., "Prompt 1").
    pub id: String,

    /// Line of business, e.g. "Commercial Auto".
    pub situation: String,

    /// Processing mode, "Structure" or "Summarize".
    pub level: String,

    /// Category of the source document.
    pub file_type: String,
}

impl PromptCriteria {
    /// Create a new prompt definition.
    pub fn new(
        id: impl Into<String>,
        situation: impl Into<String>,
        level: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            situation: situation.into(),
            level: level.into(),
            file_type: file_type.into(),
        }
    }

    /// Whether all three attributes equal the given values exactly.
    pub fn matches(&self, situation: &str, level: &str, file_type: &str) -> bool {
        self.situation == situation && self.level == level && self.file_type == file_type
    }

    fn key(&self) -> (String, String, String) {
        (
            self.situation.clone(),
            self.level.clone(),
            self.file_type.clone(),
        )
    }
}

/// Immutable, ordered criteria table with an exact-match index.
///
/// When two entries share a (situation, level, file_type) triple the earlier
/// entry wins, both for [`CriteriaTable::lookup`] and [`CriteriaTable::scan`].
#[derive(Debug, Clone)]
pub struct CriteriaTable {
    entries: Vec<PromptCriteria>,
    index: HashMap<(String, String, String), usize>,
}

impl CriteriaTable {
    /// Build a table from entries in their defined order.
    ///
    /// Rejects an empty table, blank ids or attributes and duplicate ids.
    /// Duplicate triples are accepted with a warning.
    pub fn new(entries: Vec<PromptCriteria>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let mut ids = HashSet::new();
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            for (field, value) in [
                ("id", &entry.id),
                ("situation", &entry.situation),
                ("level", &entry.level),
                ("file_type", &entry.file_type),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::BlankField {
                        id: entry.id.clone(),
                        field,
                    });
                }
            }

            if !ids.insert(entry.id.as_str()) {
                return Err(ConfigError::DuplicateId(entry.id.clone()));
            }

            match index.entry(entry.key()) {
                std::collections::hash_map::Entry::Occupied(slot) => {
                    let first: &PromptCriteria = &entries[*slot.get()];
                    warn!(
                        shadowed = %entry.id,
                        winner = %first.id,
                        "duplicate criteria, earlier prompt wins"
                    );
                }
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
        }

        Ok(Self { entries, index })
    }

    /// Entries in table order.
    pub fn entries(&self) -> &[PromptCriteria] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries. Always false for a built table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first prompt matching the triple via the index.
    pub fn lookup(&self, situation: &str, level: &str, file_type: &str) -> Option<&PromptCriteria> {
        let key = (situation.to_string(), level.to_string(), file_type.to_string());
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    /// Find the first prompt matching the triple by walking the table in order.
    pub fn scan(&self, situation: &str, level: &str, file_type: &str) -> Option<&PromptCriteria> {
        self.entries
            .iter()
            .find(|c| c.matches(situation, level, file_type))
    }

    /// Get a prompt by id.
    pub fn get(&self, id: &str) -> Option<&PromptCriteria> {
        self.entries.iter().find(|c| c.id == id)
    }
}

impl Default for CriteriaTable {
    fn default() -> Self {
        let entries = default_entries();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key(), i))
            .collect();
        Self { entries, index }
    }
}

/// The built-in prompt definitions.
pub fn default_entries() -> Vec<PromptCriteria> {
    vec![
        PromptCriteria::new("Prompt 1", "Commercial Auto", "Structure", "Summary Report"),
        PromptCriteria::new("Prompt 2", "General Liability", "Summarize", "Deposition"),
        PromptCriteria::new("Prompt 3", "Commercial Auto", "Summarize", "Summons"),
        PromptCriteria::new("Prompt 4", "Workers Compensation", "Structure", "Medical Records"),
        PromptCriteria::new("Prompt 5", "Workers Compensation", "Summarize", "Summons"),
    ]
}
