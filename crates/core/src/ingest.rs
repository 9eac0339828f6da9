//! Ingestion of the human-authored text inputs: map definitions and the flat
//! creature list.
//!
//! Map definition grammar, one map per blank-line separated block:
//!
//! ```text
//! The Island
//! DinoSpawnEntriesBeach_C
//! 0.5,Dodo,2,4
//! Dilophosaur,1,2,50%,25%
//! 0.25,Sarco
//! ```
//!
//! A known map name starts the map, a `Name_C` class line starts a container,
//! a line beginning with a digit starts a group (`weight,Creature,tokens`)
//! and any other line adds a creature to the last group.

use std::error::Error;
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::loader::{LoadError, read_json, read_text, write_json};
use crate::model::{ContainerSpec, CreatureRecord, CreatureSpec, GroupSpec, MapDefinition};
use crate::rules::GenerationRules;

/// Max percentage given to every record of a flat creature list.
pub const DEFAULT_MAX_PERCENTAGE: f64 = 0.3;

const CONTAINER_LINE: &str = r"\w+-?\w+_C";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestError {
    /// 1-based line of the offending text, 0 when not tied to a line.
    pub line: usize,
    pub message: String,
}

impl IngestError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl Error for IngestError {}

/// Parses `Name,Tag,Id` lines. Blank lines are skipped.
pub fn parse_creature_list(text: &str) -> Result<Vec<CreatureRecord>, IngestError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match fields.as_slice() {
            [name, tag, id, ..] if !name.is_empty() && !tag.is_empty() && !id.is_empty() => {
                records.push(CreatureRecord::new(*name, *tag, *id, DEFAULT_MAX_PERCENTAGE));
            }
            _ => {
                let message = format!("expected `Name,Tag,Id`, found `{line}`");
                return Err(IngestError::at(index + 1, message));
            }
        }
    }
    Ok(records)
}

/// Parses every map block of a map definition text.
pub fn parse_map_definitions(
    text: &str,
    rules: &GenerationRules,
) -> Result<Vec<MapDefinition>, IngestError> {
    let container_line =
        Regex::new(CONTAINER_LINE).map_err(|error| IngestError::at(0, error.to_string()))?;
    let mut maps = Vec::new();
    let mut block: Option<MapBlock> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            if let Some(done) = block.take() {
                maps.push(done.finish()?);
            }
            continue;
        }
        let current = block.get_or_insert_with(|| MapBlock::new(line_no));

        if let Some(map_name) = rules.known_map(line) {
            current.map_name = Some(map_name.to_string());
        } else if container_line.is_match(line) {
            current.start_container(line);
        } else if line.starts_with(|c: char| c.is_ascii_digit()) {
            let group = parse_group_line(line, line_no)?;
            current.container_mut(line_no)?.groups.push(group);
        } else {
            let creature = parse_creature(line.split(','), line_no)?;
            let container = current.container_mut(line_no)?;
            let Some(group) = container.groups.last_mut() else {
                return Err(IngestError::at(line_no, "creature line before any group line"));
            };
            group.creatures.push(creature);
        }
    }
    if let Some(done) = block.take() {
        maps.push(done.finish()?);
    }
    Ok(maps)
}

struct MapBlock {
    first_line: usize,
    map_name: Option<String>,
    containers: Vec<ContainerSpec>,
}

impl MapBlock {
    fn new(first_line: usize) -> Self {
        Self { first_line, map_name: None, containers: Vec::new() }
    }

    fn start_container(&mut self, class_name: &str) {
        self.containers
            .push(ContainerSpec { class_name: class_name.to_string(), groups: Vec::new() });
    }

    fn container_mut(&mut self, line: usize) -> Result<&mut ContainerSpec, IngestError> {
        self.containers
            .last_mut()
            .ok_or_else(|| IngestError::at(line, "group line before any container class line"))
    }

    fn finish(self) -> Result<MapDefinition, IngestError> {
        let Some(map_name) = self.map_name else {
            return Err(IngestError::at(self.first_line, "map block has no known map name"));
        };
        Ok(MapDefinition { map_name, containers: self.containers })
    }
}

fn parse_group_line(line: &str, line_no: usize) -> Result<GroupSpec, IngestError> {
    let mut fields = line.split(',');
    let weight_text = fields.next().unwrap_or_default().trim();
    let weight = weight_text
        .parse::<f64>()
        .map_err(|_| IngestError::at(line_no, format!("invalid group weight `{weight_text}`")))?;
    let creature = parse_creature(fields, line_no)?;
    Ok(GroupSpec { weight, creatures: vec![creature] })
}

/// Reads `Creature,tokens...`: `N%` adds a percentage of N/100, the first
/// integer is the min count and the next one the max count.
fn parse_creature<'a>(
    mut fields: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<CreatureSpec, IngestError> {
    let name = fields.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(IngestError::at(line_no, "missing creature name"));
    }
    let mut creature = CreatureSpec::new(name);
    let mut min_seen = false;

    for token in fields.map(str::trim).filter(|token| !token.is_empty()) {
        if let Some(percent) = token.strip_suffix('%') {
            let value = percent.trim().parse::<f64>().map_err(|_| {
                IngestError::at(line_no, format!("invalid percentage `{token}`"))
            })?;
            creature.percentages.push(value / 100.0);
            continue;
        }
        let count = token
            .parse::<i32>()
            .map_err(|_| IngestError::at(line_no, format!("invalid count `{token}`")))?;
        if min_seen {
            creature.max_count = count;
        } else {
            creature.min_count = count;
            min_seen = true;
        }
    }
    creature.max_count = creature.max_count.max(creature.min_count);
    Ok(creature)
}

/// Loads map definitions from JSON, or from the text grammar for any other
/// extension.
pub fn load_map_definitions(
    path: &Path,
    rules: &GenerationRules,
) -> Result<Vec<MapDefinition>, LoadError> {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        return read_json(path);
    }
    let text = read_text(path)?;
    parse_map_definitions(&text, rules).map_err(|error| LoadError::Invalid {
        path: path.to_path_buf(),
        line: error.line,
        message: error.message,
    })
}

pub fn save_map_definitions(path: &Path, maps: &[MapDefinition]) -> Result<(), LoadError> {
    write_json(path, maps)
}

/// Case-insensitive lookup by map name.
pub fn find_map<'m>(maps: &'m [MapDefinition], name: &str) -> Option<&'m MapDefinition> {
    let name = name.trim();
    maps.iter().find(|map| map.map_name.eq_ignore_ascii_case(name))
}
