// FlowTrace - core/filter.rs
//
// Composable filter engine for step content.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O dependencies.

use crate::core::model::{Severity, Step};
use crate::util::error::FilterError;
use regex::Regex;
use std::collections::HashSet;

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Severities to include (empty = all). Structural items (key-value,
    /// list, JSON) count as `Plain`.
    pub severities: HashSet<Severity>,

    /// Substring text search (case-insensitive). Empty = no filter.
    pub text_search: String,

    /// Compiled regex search. None = no regex filter.
    pub regex_search: Option<Regex>,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.severities.is_empty() && self.text_search.is_empty() && self.regex_search.is_none()
    }

    /// Set the regex search pattern, compiling it.
    /// Returns an error if the pattern is invalid.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), FilterError> {
        if pattern.is_empty() {
            self.regex_search = None;
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        self.regex_search = Some(regex);
        Ok(())
    }

    /// Create a quick-filter for error messages only.
    pub fn errors_only() -> Self {
        let mut severities = HashSet::new();
        severities.insert(Severity::Error);
        Self {
            severities,
            ..Default::default()
        }
    }

    /// Create a quick-filter for errors and warnings.
    pub fn errors_and_warnings() -> Self {
        let mut severities = HashSet::new();
        severities.insert(Severity::Error);
        severities.insert(Severity::Warning);
        Self {
            severities,
            ..Default::default()
        }
    }
}

/// Apply filters to a step sequence, returning steps that hold only the
/// matching items. Steps whose content is emptied by the filter are
/// dropped so the rendered output stays compact; with no active filters
/// the input is returned unchanged (headers with no content included).
pub fn apply_filters(steps: &[Step], filter: &FilterState) -> Vec<Step> {
    if filter.is_empty() {
        return steps.to_vec();
    }

    let text_lower = filter.text_search.to_lowercase();

    steps
        .iter()
        .filter_map(|step| {
            let content: Vec<_> = step
                .content
                .iter()
                .filter(|item| {
                    // Severity filter
                    if !filter.severities.is_empty()
                        && !filter.severities.contains(&item.severity())
                    {
                        return false;
                    }

                    // Text search (case-insensitive substring)
                    if !text_lower.is_empty()
                        && !item.search_text().to_lowercase().contains(&text_lower)
                    {
                        return false;
                    }

                    // Regex search
                    if let Some(ref regex) = filter.regex_search {
                        if !regex.is_match(item.search_text()) {
                            return false;
                        }
                    }

                    true
                })
                .cloned()
                .collect();

            if content.is_empty() {
                None
            } else {
                Some(Step {
                    header: step.header.clone(),
                    content,
                })
            }
        })
        .collect()
}
