//! Structural model shared by the parser, the validator and the generator.

use serde::{Deserialize, Serialize};

/// Top-level key a container record is written under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerDirective {
    /// Replaces the game's own entries for the container.
    #[default]
    Override,
    /// Adds entries on top of the game's own entries.
    Add,
}

impl ContainerDirective {
    pub const OVERRIDE_KEY: &'static str = "ConfigOverrideNPCSpawnEntriesContainer";
    pub const ADD_KEY: &'static str = "ConfigAddNPCSpawnEntriesContainer";

    pub fn key(self) -> &'static str {
        match self {
            Self::Override => Self::OVERRIDE_KEY,
            Self::Add => Self::ADD_KEY,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            Self::OVERRIDE_KEY => Some(Self::Override),
            Self::ADD_KEY => Some(Self::Add),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Offset {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub fn vertical(y: i32) -> Self {
        Self { x: 0, y, z: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyRange {
    pub min_level: i32,
    pub max_level: i32,
}

/// One weighted spawn rule.
///
/// Multi-id entries carry one percentage and one offset per id plus a spread
/// radius; single-id entries carry none of the three.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub name: String,
    pub weight: f64,
    pub color_set: String,
    pub creature_ids: Vec<String>,
    pub percentages: Vec<f64>,
    pub offsets: Vec<Offset>,
    pub spread_radius: Option<f64>,
    pub difficulty: Option<DifficultyRange>,
}

impl SpawnEntry {
    pub fn is_mob(&self) -> bool {
        self.creature_ids.len() > 1
    }

    /// Creature ids in first-seen order without repeats.
    pub fn distinct_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.creature_ids.len());
        for id in &self.creature_ids {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnLimit {
    pub creature_id: String,
    pub max_percentage: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub directive: ContainerDirective,
    pub name: String,
    pub entries: Vec<SpawnEntry>,
    pub limits: Vec<SpawnLimit>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Distinct creature ids referenced by any entry, in first-seen order.
    pub fn entry_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for entry in &self.entries {
            for id in entry.distinct_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Adds a limit unless one for the same id already exists.
    pub fn push_limit(&mut self, limit: SpawnLimit) -> bool {
        if self.limits.iter().any(|existing| existing.creature_id == limit.creature_id) {
            return false;
        }
        self.limits.push(limit);
        true
    }
}

/// A registry row: one concrete spawnable identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    #[serde(rename = "CreatureName")]
    pub display_name: String,
    #[serde(rename = "NameTag")]
    pub species_tag: String,
    #[serde(rename = "CreatureID")]
    pub id: String,
    #[serde(rename = "MaxPercentage")]
    pub default_max_percentage: f64,
}

impl CreatureRecord {
    pub fn new(
        display_name: impl Into<String>,
        species_tag: impl Into<String>,
        id: impl Into<String>,
        default_max_percentage: f64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            species_tag: species_tag.into(),
            id: id.into(),
            default_max_percentage,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    #[serde(rename = "MapName")]
    pub map_name: String,
    #[serde(rename = "Containers", default)]
    pub containers: Vec<ContainerSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    #[serde(rename = "ClassName")]
    pub class_name: String,
    #[serde(rename = "Groups", default)]
    pub groups: Vec<GroupSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "Creatures", default)]
    pub creatures: Vec<CreatureSpec>,
}

impl GroupSpec {
    /// Requested creature names in first-seen order without repeats.
    pub fn requested_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for creature in &self.creatures {
            if !names.contains(&creature.name.as_str()) {
                names.push(&creature.name);
            }
        }
        names
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatureSpec {
    #[serde(rename = "CreatureName")]
    pub name: String,
    #[serde(rename = "Min", default)]
    pub min_count: i32,
    #[serde(rename = "Max", default)]
    pub max_count: i32,
    #[serde(rename = "Percentages", default)]
    pub percentages: Vec<f64>,
}

impl CreatureSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), min_count: 0, max_count: 0, percentages: Vec::new() }
    }

    pub fn with_percentages(mut self, percentages: &[f64]) -> Self {
        self.percentages = percentages.to_vec();
        self
    }
}

/// Rounds to three decimal places, the precision every generated number uses.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
