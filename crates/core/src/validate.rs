//! Structural and semantic checks over parsed containers.
//!
//! Every check runs independently and all findings are collected. Nothing
//! here stops early: a defect in one container or entry never hides the
//! findings of the next one.

use std::collections::HashSet;

use regex::Regex;

use crate::codec::RecordScanner;
use crate::diagnostics::{Diagnostic, Finding, MobField, Severity};
use crate::model::{Container, SpawnEntry};
use crate::rules::ValidationRules;

const REPEATED_SEPARATORS: &str = r",{2,}";
const IRREGULAR_SEQUENCE: &str = r#"\),\)|,\),|\(,\(|,\(,|"""#;
const EMPTY_PAIR: &str = r"\(\)";

/// Result of validating a whole document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub containers: Vec<Container>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

#[derive(Clone, Debug)]
pub struct Validator {
    rules: ValidationRules,
    scanner: RecordScanner,
    repeated_separators: Regex,
    irregular_sequence: Regex,
    empty_pair: Regex,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Result<Self, regex::Error> {
        Ok(Self {
            rules,
            scanner: RecordScanner::new()?,
            repeated_separators: Regex::new(REPEATED_SEPARATORS)?,
            irregular_sequence: Regex::new(IRREGULAR_SEQUENCE)?,
            empty_pair: Regex::new(EMPTY_PAIR)?,
        })
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Scans, parses and validates every container record in `text`.
    pub fn validate_document(&self, text: &str) -> ValidationReport {
        let document = self.scanner.parse_document(text);
        let mut diagnostics = Vec::new();
        for record in &document.records {
            let name = &record.parsed.container.name;
            diagnostics.extend(self.check_syntax(name, &record.text));
            diagnostics.extend(record.parsed.diagnostics.iter().cloned());
        }
        let containers = document.containers();
        diagnostics.extend(self.validate_containers(&containers));
        tracing::debug!(
            records = document.records.len(),
            diagnostics = diagnostics.len(),
            "validated document"
        );
        ValidationReport { containers, diagnostics }
    }

    /// Raw-text checks on one record: delimiter balance and separator
    /// irregularities.
    pub fn check_syntax(&self, container: &str, raw: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let open = raw.matches('(').count();
        let close = raw.matches(')').count();
        if open != close {
            let finding = Finding::UnbalancedDelimiters { open, close };
            diagnostics.push(Diagnostic::container(container, finding));
        }
        if self.repeated_separators.is_match(raw) {
            diagnostics.push(Diagnostic::container(container, Finding::ConsecutiveSeparators));
        }
        if self.irregular_sequence.is_match(raw) {
            diagnostics.push(Diagnostic::container(container, Finding::IrregularSeparatorSequence));
        }
        if self.empty_pair.is_match(raw) {
            diagnostics.push(Diagnostic::container(container, Finding::EmptyDelimiterPair));
        }
        diagnostics
    }

    /// Model checks over a set of containers validated together. Container
    /// and entry names must be unique across the whole set.
    pub fn validate_containers(&self, containers: &[Container]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut container_names: HashSet<&str> = HashSet::new();
        let mut entry_names: HashSet<&str> = HashSet::new();

        for container in containers {
            if !container.name.is_empty() && !container_names.insert(&container.name) {
                let finding = Finding::DuplicateContainer;
                diagnostics.push(Diagnostic::container(&container.name, finding));
            }
            for entry in &container.entries {
                if !entry.name.is_empty() && !entry_names.insert(&entry.name) {
                    diagnostics.push(Diagnostic::entry(
                        &container.name,
                        &entry.name,
                        Finding::DuplicateEntry,
                    ));
                }
            }
            diagnostics.extend(self.validate_container(container));
        }
        diagnostics
    }

    /// Checks confined to one container.
    pub fn validate_container(&self, container: &Container) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let name = container.name.as_str();

        let entry_ids = container.entry_ids();
        let limit_ids: Vec<&str> = container
            .limits
            .iter()
            .map(|limit| limit.creature_id.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        let missing_limits: Vec<String> = entry_ids
            .iter()
            .filter(|id| !limit_ids.contains(id))
            .map(|id| id.to_string())
            .collect();
        let mut orphan_limits: Vec<String> = Vec::new();
        for id in &limit_ids {
            if !entry_ids.contains(id) && !orphan_limits.iter().any(|seen| seen == id) {
                orphan_limits.push(id.to_string());
            }
        }
        if !missing_limits.is_empty() {
            let finding = Finding::MissingLimits { ids: missing_limits };
            diagnostics.push(Diagnostic::container(name, finding));
        }
        if !orphan_limits.is_empty() {
            let finding = Finding::OrphanLimits { ids: orphan_limits };
            diagnostics.push(Diagnostic::container(name, finding));
        }

        for entry in &container.entries {
            diagnostics.extend(
                self.entry_findings(entry)
                    .into_iter()
                    .map(|finding| Diagnostic::entry(name, &entry.name, finding)),
            );
        }

        for limit in &container.limits {
            if limit.max_percentage < 0.0 {
                diagnostics.push(Diagnostic::container(
                    name,
                    Finding::NegativeLimit {
                        creature_id: limit.creature_id.clone(),
                        value: limit.max_percentage,
                    },
                ));
            } else if limit.max_percentage > 1.0 {
                diagnostics.push(Diagnostic::container(
                    name,
                    Finding::PercentageOutOfBounds { values: vec![limit.max_percentage] },
                ));
            }
        }
        diagnostics
    }

    fn entry_findings(&self, entry: &SpawnEntry) -> Vec<Finding> {
        let mut findings = Vec::new();
        let ids = entry.creature_ids.len();

        if entry.is_mob() {
            if entry.percentages.len() != ids {
                findings.push(Finding::LengthMismatch {
                    field: MobField::Percentages,
                    ids,
                    values: entry.percentages.len(),
                });
            }
            if entry.offsets.len() != ids {
                findings.push(Finding::LengthMismatch {
                    field: MobField::Offsets,
                    ids,
                    values: entry.offsets.len(),
                });
            }
            match entry.spread_radius {
                None => findings.push(Finding::MissingSpreadRadius),
                Some(radius) if radius < self.rules.min_spread_radius => {
                    findings.push(Finding::SpreadRadiusBelowFloor {
                        radius,
                        floor: self.rules.min_spread_radius,
                    });
                }
                Some(_) => {}
            }
        } else if !entry.percentages.is_empty()
            || !entry.offsets.is_empty()
            || entry.spread_radius.is_some()
        {
            findings.push(Finding::MobFieldsOnSingleSpawn);
        }

        let mut seen = HashSet::new();
        let mut colliding: Vec<i32> = Vec::new();
        for offset in &entry.offsets {
            if !seen.insert(offset.y) && !colliding.contains(&offset.y) {
                colliding.push(offset.y);
            }
        }
        if !colliding.is_empty() {
            findings.push(Finding::OffsetCollision { ys: colliding });
        }

        let out_of_bounds: Vec<f64> = entry
            .percentages
            .iter()
            .copied()
            .filter(|value| !(0.0..=1.0).contains(value))
            .collect();
        if !out_of_bounds.is_empty() {
            findings.push(Finding::PercentageOutOfBounds { values: out_of_bounds });
        }

        if let Some(range) = entry.difficulty
            && range.min_level > range.max_level
        {
            findings.push(Finding::InvertedDifficultyRange {
                min_level: range.min_level,
                max_level: range.max_level,
            });
        }
        findings
    }
}

#[cfg(test)]
mod tests;
