//! Two-way codec between container records and the structural model.
//!
//! A record is one line of the form
//! `ConfigOverrideNPCSpawnEntriesContainer=(NPCSpawnEntriesContainerClassString="...",NPCSpawnEntries=(...),NPCSpawnLimits=(...))`.
//! Parsing is tolerant: absent optional fields fall back to defaults, while
//! absent required fields, empty values and unreadable numbers become
//! diagnostics scoped to the field that carried them.

mod lexer;
mod render;

use regex::Regex;

use crate::diagnostics::{Diagnostic, Finding};
use crate::model::{Container, ContainerDirective, DifficultyRange, Offset, SpawnEntry, SpawnLimit};

use lexer::{Node, parse_tree, tokenize};

pub use render::{render_container, render_document, render_entry, render_limit};

pub mod fields {
    pub const CLASS_STRING: &str = "NPCSpawnEntriesContainerClassString";
    pub const ENTRIES: &str = "NPCSpawnEntries";
    pub const LIMITS: &str = "NPCSpawnLimits";

    pub const ENTRY_NAME: &str = "AnEntryName";
    pub const COLOR_SETS: &str = "ColorSets";
    pub const PERCENTAGES: &str = "NPCsToSpawnPercentageChance";
    pub const SPREAD_RADIUS: &str = "ManualSpawnPointSpreadRadius";
    pub const OFFSETS: &str = "NPCsSpawnOffsets";
    pub const WEIGHT: &str = "EntryWeight";
    pub const SPAWN_STRINGS: &str = "NPCsToSpawnStrings";
    pub const DIFFICULTY: &str = "NPCDifficultyLevelRanges";
    pub const LEVELS_MIN: &str = "EnemyLevelsMin";
    pub const LEVELS_MAX: &str = "EnemyLevelsMax";
    pub const GAME_DIFFICULTIES: &str = "GameDifficulties";

    pub const LIMIT_CLASS: &str = "NPCClassString";
    pub const LIMIT_MAX: &str = "MaxPercentageOfDesiredNumToAllow";
}

/// Pattern matching a line that carries a container record.
pub const RECORD_PATTERN: &str = r"^\s*Config(Override|Add)NPCSpawnEntriesContainer\s*=";

#[derive(Clone, Debug, PartialEq)]
pub struct ParsedContainer {
    pub container: Container,
    pub diagnostics: Vec<Diagnostic>,
}

/// One record as found in a document, kept alongside its parse result so the
/// raw-text syntax checks can run on the exact source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRecord {
    pub line: usize,
    pub text: String,
    pub parsed: ParsedContainer,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedDocument {
    pub records: Vec<SourceRecord>,
}

impl ParsedDocument {
    pub fn containers(&self) -> Vec<Container> {
        self.records.iter().map(|record| record.parsed.container.clone()).collect()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.records.iter().flat_map(|record| record.parsed.diagnostics.iter().cloned()).collect()
    }
}

/// Finds container records in a whole config file.
#[derive(Clone, Debug)]
pub struct RecordScanner {
    pattern: Regex,
}

impl RecordScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { pattern: Regex::new(RECORD_PATTERN)? })
    }

    /// Lines of `text` that hold a container record, with 1-based line numbers.
    pub fn find_records<'t>(&self, text: &'t str) -> Vec<(usize, &'t str)> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| self.pattern.is_match(line))
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
            .collect()
    }

    pub fn parse_document(&self, text: &str) -> ParsedDocument {
        let records = self
            .find_records(text)
            .into_iter()
            .map(|(line, record)| SourceRecord {
                line,
                text: record.to_string(),
                parsed: parse_container(record),
            })
            .collect();
        ParsedDocument { records }
    }
}

pub fn parse_container(record: &str) -> ParsedContainer {
    let lexed = tokenize(record);
    let tree = parse_tree(&lexed.tokens);

    let empty = Node::Empty;
    let (directive_key, body) = match tree.items().first() {
        Some(item) => (item.key.as_deref(), &item.value),
        None => (None, &empty),
    };
    let directive = directive_key.and_then(ContainerDirective::from_key);

    let name = body
        .field(fields::CLASS_STRING)
        .and_then(|value| value.innermost().text())
        .unwrap_or_default()
        .trim()
        .to_string();
    let mut sink = Sink { container: name.clone(), diagnostics: Vec::new() };

    match body.field(fields::CLASS_STRING) {
        None => sink.container_finding(Finding::MissingField { field: fields::CLASS_STRING }),
        Some(_) if name.is_empty() => {
            sink.container_finding(Finding::EmptyField { field: fields::CLASS_STRING })
        }
        Some(_) => {}
    }
    if directive.is_none() {
        sink.container_finding(Finding::UnrecognizedRecord { context: "container" });
    }
    if lexed.unterminated_string {
        sink.container_finding(Finding::UnterminatedString);
    }

    let mut entries = Vec::new();
    match body.field(fields::ENTRIES) {
        Some(list) => {
            for item in list.items() {
                if item.key.is_none() && item.value.has_field(fields::ENTRY_NAME) {
                    entries.push(parse_entry(&item.value, &mut sink));
                } else {
                    sink.container_finding(Finding::UnrecognizedRecord { context: "spawn entry" });
                }
            }
        }
        None => sink.container_finding(Finding::MissingField { field: fields::ENTRIES }),
    }

    let mut limits = Vec::new();
    match body.field(fields::LIMITS) {
        Some(list) => {
            for item in list.items() {
                if item.key.is_none() && item.value.has_field(fields::LIMIT_CLASS) {
                    limits.push(parse_limit(&item.value, &mut sink));
                } else {
                    sink.container_finding(Finding::UnrecognizedRecord { context: "spawn limit" });
                }
            }
        }
        None => sink.container_finding(Finding::MissingField { field: fields::LIMITS }),
    }

    ParsedContainer {
        container: Container { directive: directive.unwrap_or_default(), name, entries, limits },
        diagnostics: sink.diagnostics,
    }
}

struct Sink {
    container: String,
    diagnostics: Vec<Diagnostic>,
}

impl Sink {
    fn container_finding(&mut self, finding: Finding) {
        self.diagnostics.push(Diagnostic::container(&self.container, finding));
    }

    fn entry_finding(&mut self, entry: &str, finding: Finding) {
        self.diagnostics.push(Diagnostic::entry(&self.container, entry, finding));
    }
}

/// Reads a scalar field. Absent yields `None` silently unless `required`;
/// present but empty is always reported.
fn scalar<'n>(
    node: &'n Node,
    field: &'static str,
    required: bool,
    entry: &str,
    sink: &mut Sink,
) -> Option<&'n str> {
    match node.field(field) {
        None => {
            if required {
                sink.entry_finding(entry, Finding::MissingField { field });
            }
            None
        }
        Some(value) => match value.innermost().text() {
            Some(text) if !text.trim().is_empty() => Some(text.trim()),
            _ => {
                sink.entry_finding(entry, Finding::EmptyField { field });
                None
            }
        },
    }
}

fn number(
    node: &Node,
    field: &'static str,
    required: bool,
    entry: &str,
    sink: &mut Sink,
) -> Option<f64> {
    let text = scalar(node, field, required, entry, sink)?;
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            sink.entry_finding(entry, Finding::InvalidValue { field, value: text.to_string() });
            None
        }
    }
}

fn integer(node: &Node, field: &'static str, entry: &str, sink: &mut Sink) -> Option<i32> {
    let text = scalar(node, field, true, entry, sink)?;
    match text.parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            sink.entry_finding(entry, Finding::InvalidValue { field, value: text.to_string() });
            None
        }
    }
}

/// Reads a parenthesized list field, one element per item.
fn list<'n>(
    node: &'n Node,
    field: &'static str,
    required: bool,
    entry: &str,
    sink: &mut Sink,
) -> Option<Vec<&'n Node>> {
    match node.field(field) {
        None => {
            if required {
                sink.entry_finding(entry, Finding::MissingField { field });
            }
            None
        }
        Some(Node::List(items)) if !items.is_empty() => {
            Some(items.iter().map(|item| &item.value).collect())
        }
        Some(Node::List(_)) | Some(Node::Empty) => {
            sink.entry_finding(entry, Finding::EmptyField { field });
            None
        }
        Some(single) => Some(vec![single]),
    }
}

fn parse_entry(node: &Node, sink: &mut Sink) -> SpawnEntry {
    let name = node
        .field(fields::ENTRY_NAME)
        .and_then(|value| value.innermost().text())
        .unwrap_or_default()
        .trim()
        .to_string();
    if name.is_empty() {
        sink.entry_finding(&name, Finding::EmptyField { field: fields::ENTRY_NAME });
    }

    let mut entry = SpawnEntry { name, ..SpawnEntry::default() };
    let name = entry.name.clone();

    entry.weight = number(node, fields::WEIGHT, true, &name, sink).unwrap_or_default();
    entry.color_set =
        scalar(node, fields::COLOR_SETS, false, &name, sink).unwrap_or_default().to_string();

    if let Some(ids) = list(node, fields::SPAWN_STRINGS, true, &name, sink) {
        for id in ids {
            match id.text().map(str::trim) {
                Some(text) if !text.is_empty() => entry.creature_ids.push(text.to_string()),
                _ => {
                    sink.entry_finding(&name, Finding::EmptyField { field: fields::SPAWN_STRINGS })
                }
            }
        }
    }

    if let Some(values) = list(node, fields::PERCENTAGES, false, &name, sink) {
        for value in values {
            let text = value.text().unwrap_or_default().trim();
            match text.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => entry.percentages.push(parsed),
                _ => sink.entry_finding(
                    &name,
                    Finding::InvalidValue { field: fields::PERCENTAGES, value: text.to_string() },
                ),
            }
        }
    }

    if let Some(offsets) = list(node, fields::OFFSETS, false, &name, sink) {
        for offset in offsets {
            match parse_offset(offset) {
                Some(parsed) => entry.offsets.push(parsed),
                None => sink.entry_finding(
                    &name,
                    Finding::InvalidValue { field: fields::OFFSETS, value: describe(offset) },
                ),
            }
        }
    }

    entry.spread_radius = number(node, fields::SPREAD_RADIUS, false, &name, sink);

    if let Some(ranges) = list(node, fields::DIFFICULTY, false, &name, sink) {
        if let Some(range) = ranges.first() {
            let min_level = integer(range, fields::LEVELS_MIN, &name, sink);
            let max_level = integer(range, fields::LEVELS_MAX, &name, sink);
            if let (Some(min_level), Some(max_level)) = (min_level, max_level) {
                entry.difficulty = Some(DifficultyRange { min_level, max_level });
            }
        }
    }

    entry
}

fn parse_offset(node: &Node) -> Option<Offset> {
    let axis = |key: &str| -> Option<i32> {
        node.field(key)?.innermost().text()?.trim().parse::<i32>().ok()
    };
    Some(Offset { x: axis("X")?, y: axis("Y")?, z: axis("Z")? })
}

fn describe(node: &Node) -> String {
    match node {
        Node::Quoted(text) | Node::Bare(text) => text.clone(),
        Node::List(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match &item.key {
                    Some(key) => format!("{key}={}", describe(&item.value)),
                    None => describe(&item.value),
                })
                .collect();
            format!("({})", parts.join(","))
        }
        Node::Empty => String::new(),
    }
}

fn parse_limit(node: &Node, sink: &mut Sink) -> SpawnLimit {
    let creature_id = node
        .field(fields::LIMIT_CLASS)
        .and_then(|value| value.innermost().text())
        .unwrap_or_default()
        .trim()
        .to_string();
    if creature_id.is_empty() {
        sink.container_finding(Finding::EmptyField { field: fields::LIMIT_CLASS });
    }
    let max_percentage = number(node, fields::LIMIT_MAX, true, "", sink).unwrap_or_default();
    SpawnLimit { creature_id, max_percentage }
}

#[cfg(test)]
mod tests;
