//! Per-map placement tables for creatures the map definition does not cover.
//!
//! Extra placements add named creatures to specific containers. Missing
//! creature rules place a creature absent from the map definition in every
//! container whose class name contains one of its map locations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::{LoadError, read_json};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtraPlacement {
    #[serde(rename = "MapName")]
    pub map_name: String,
    #[serde(rename = "ContainerClass")]
    pub container_class: String,
    /// Registry display names, placed in this order.
    #[serde(rename = "Creatures", default)]
    pub creatures: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLocations {
    #[serde(rename = "MapName")]
    pub map_name: String,
    #[serde(rename = "Locations", default)]
    pub locations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissingCreature {
    #[serde(rename = "CreatureName")]
    pub creature_name: String,
    #[serde(rename = "MapLocations", default)]
    pub map_locations: Vec<MapLocations>,
}

impl MissingCreature {
    pub fn locations_on(&self, map_name: &str) -> Option<&[String]> {
        self.map_locations
            .iter()
            .find(|entry| entry.map_name == map_name)
            .map(|entry| entry.locations.as_slice())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementTables {
    pub extra: Vec<ExtraPlacement>,
    pub missing: Vec<MissingCreature>,
}

impl PlacementTables {
    /// No placements at all.
    pub fn empty() -> Self {
        Self { extra: Vec::new(), missing: Vec::new() }
    }

    /// Built-in extra placements and no missing-creature rules.
    pub fn build_default() -> Self {
        let extra = [
            (
                "Lost Island",
                "DinoSpawnEntriesBeach_LostIsland_C",
                &["Sinomacrops", "Aberrant Sarco", "R Procoptodon", "R Equus"][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesJungle_LostIsland_C",
                &["X Sabertooth", "Ravager", "Lymantria", "Megaloceros"][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesMountain_C",
                &[
                    "Morellatops",
                    "Thorny Dragon",
                    "Aberrant Megalania",
                    "Aberrant Araneo",
                    "Mantis",
                ][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesMountain1_C",
                &[
                    "Morellatops",
                    "Thorny Dragon",
                    "Aberrant Megalania",
                    "Aberrant Araneo",
                    "Mantis",
                    "R Thylacoleo",
                ][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesGrassland_LostIsland_1_C",
                &["R Thylacoleo", "Chalicotherium", "X Woolly Rhino"][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesGrassland_LostIsland_2_C",
                &["Chalicotherium", "X Woolly Rhino"][..],
            ),
            (
                "Lost Island",
                "DinoSpawnEntriesGrassland_LostIsland_C",
                &["R Daeodon", "Chalicotherium", "X Woolly Rhino"][..],
            ),
            (
                "The Center",
                "DinoSpawnEntriesJungle_C",
                &[
                    "X Sabertooth",
                    "R Procoptodon",
                    "Lymantria",
                    "R Equus",
                    "Terror Bird",
                    "Hyaenodon",
                ][..],
            ),
            ("The Center", "DinoSpawnEntriesBeach_C", &["Aberrant Sarco", "Hyaenodon"][..]),
            ("The Center", "SnowGrasslandsUnderArea_Spawn_C", &["R Thylacoleo", "R Daeodon"][..]),
            ("The Center", "SnowGrasslands_Spawn_C", &["X Yutyrannus", "R Daeodon"][..]),
            (
                "The Center",
                "DinoSpawnEntriesMountain_C",
                &["Aberrant Megalania", "Aberrant Araneo", "Aberrant Megalosaurus"][..],
            ),
            ("Fjordur", "DinoSpawnEntriesRedwoods_C", &["Ravager"][..]),
        ]
        .into_iter()
        .map(|(map_name, container_class, creatures)| ExtraPlacement {
            map_name: map_name.to_string(),
            container_class: container_class.to_string(),
            creatures: creatures.iter().map(|name| name.to_string()).collect(),
        })
        .collect();
        Self { extra, missing: Vec::new() }
    }

    /// Replaces the missing-creature rules with the contents of a JSON file.
    pub fn with_missing_file(mut self, path: &Path) -> Result<Self, LoadError> {
        self.missing = read_json(path)?;
        Ok(self)
    }

    /// Replaces the extra placements with the contents of a JSON file.
    pub fn with_extra_file(mut self, path: &Path) -> Result<Self, LoadError> {
        self.extra = read_json(path)?;
        Ok(self)
    }

    /// Creature names placed in `container_class` on `map_name`.
    pub fn extras_for(&self, map_name: &str, container_class: &str) -> &[String] {
        self.extra
            .iter()
            .find(|placement| {
                placement.map_name == map_name && placement.container_class == container_class
            })
            .map(|placement| placement.creatures.as_slice())
            .unwrap_or_default()
    }

    pub fn missing_rule(&self, creature_name: &str) -> Option<&MissingCreature> {
        self.missing.iter().find(|rule| rule.creature_name == creature_name)
    }

    /// Whether a missing creature belongs in `container_class`: any of its
    /// locations on the map occurs in the class name with underscores removed.
    pub fn places_missing(
        &self,
        creature_name: &str,
        map_name: &str,
        container_class: &str,
    ) -> bool {
        let class = container_class.replace('_', "");
        self.missing_rule(creature_name).and_then(|rule| rule.locations_on(map_name)).is_some_and(
            |locations| locations.iter().any(|location| class.contains(location.as_str())),
        )
    }
}

impl Default for PlacementTables {
    fn default() -> Self {
        Self::build_default()
    }
}
