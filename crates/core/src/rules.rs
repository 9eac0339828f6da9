//! Lookup tables that steer grouping, synthesis and validation.
//!
//! Every list here is plain data. [`GenerationRules::default`] carries the
//! production tables; a TOML file can override any subset of them, and tests
//! substitute small fixtures.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::{LoadError, read_toml};
use crate::model::{DifficultyRange, round3};

/// Largest accepted offset step; keeps offset layout well inside `i32`.
pub const MAX_OFFSET_STEP: i32 = 100_000;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRules {
    /// Map names recognized when ingesting map definitions.
    pub map_names: Vec<String>,
    /// Words dropped from display names to get the species base key.
    pub name_variant_markers: Vec<String>,
    /// Substrings marking a concrete id as a variant of its species.
    pub id_variant_markers: Vec<String>,
    /// Species whose variant ids misbehave in game and are dropped.
    pub problem_species: Vec<String>,
    /// Variant marker that does not make a problem-species id droppable.
    pub problem_exempt_marker: String,
    /// Display names whose plain record stays even when variants exist.
    pub keep_basic: Vec<String>,
    pub boss_tags: Vec<String>,
    /// Species whose variants spawn in one shared entry.
    pub spawn_together_tags: Vec<String>,
    pub excluded_minion_ids: Vec<String>,
    /// Id prefix of aberration-only creatures; bosses pair within their side.
    pub aberration_prefix: String,
    /// Id substrings of species that need wider offset spacing.
    pub bulky_markers: Vec<String>,
    pub offset_step: i32,
    pub bulky_offset_step: i32,
    pub spread_radius: f64,
    pub color_set: String,
    pub mob_suffix: String,
    pub low_frequency_weight: f64,
    pub low_frequency_max_percentage: f64,
    pub limit_divisor: f64,
    pub limit_floor: f64,
    pub difficulty_ranges: BTreeMap<String, DifficultyRange>,
}

impl GenerationRules {
    pub fn build_default() -> Self {
        let levels = |min_level, max_level| DifficultyRange { min_level, max_level };
        let difficulty_ranges = [
            ("BogSpider_Character_BP_C", levels(20, 37)),
            ("RockDrake_Character_BP_C", levels(15, 27)),
            ("Wyvern_Character_BP_Fire_C", levels(15, 27)),
            ("Wyvern_Character_BP_Lightning_C", levels(15, 27)),
            ("Wyvern_Character_BP_Poison_C", levels(15, 27)),
            ("Ragnarok_Wyvern_Override_Ice_C", levels(15, 27)),
            ("Deinonychus_Character_BP_C", levels(15, 38)),
            ("Cherufe_Character_BP_C", levels(10, 20)),
        ]
        .into_iter()
        .map(|(id, range)| (id.to_string(), range))
        .collect();

        Self {
            map_names: strings(&[
                "The Island",
                "The Center",
                "Scorched Earth",
                "Ragnarok",
                "Aberration",
                "Extinction",
                "Valguero",
                "Genesis: Part 1",
                "Crystal Isles",
                "Genesis: Part 2",
                "Lost Island",
                "Fjordur",
            ]),
            name_variant_markers: strings(&["Aberrant", "X", "R", "Lunar", "Tek"]),
            id_variant_markers: strings(&[
                "Aberrant", "Bionic", "Eden", "Rockwell", "Snow", "Volcano", "Bog", "Ocean", "Ice",
                "Chalk", "Rubble", "Lunar", "Yeti", "DA_",
            ]),
            problem_species: strings(&["Carno", "Rex", "Mega", "Mosasaur", "Coel"]),
            problem_exempt_marker: "Bionic".to_string(),
            keep_basic: strings(&[
                "Carnotaurus",
                "Rex",
                "Megalodon",
                "Mosasaur",
                "Coelacanth",
                "Basilosaurus",
            ]),
            boss_tags: strings(&["Yutyrannus", "Basilosaurus"]),
            spawn_together_tags: strings(&["Ant", "Leech"]),
            excluded_minion_ids: strings(&["Carno_Character_BP_Aberrant_C"]),
            aberration_prefix: "DA_".to_string(),
            bulky_markers: strings(&["Sauropod", "Cherufe", "Plesiosaur"]),
            offset_step: 400,
            bulky_offset_step: 1000,
            spread_radius: 650.0,
            color_set: "DinoColorSet_AllColors_C".to_string(),
            mob_suffix: "Mob".to_string(),
            low_frequency_weight: 0.001,
            low_frequency_max_percentage: 0.01,
            limit_divisor: 10.0,
            limit_floor: 0.001,
            difficulty_ranges,
        }
    }

    /// Species base key: whitespace and variant-marker words removed,
    /// lowercased.
    pub fn base_key(&self, display_name: &str) -> String {
        display_name
            .split_whitespace()
            .filter(|word| {
                !self.name_variant_markers.iter().any(|marker| marker.eq_ignore_ascii_case(word))
            })
            .collect::<String>()
            .to_lowercase()
    }

    pub fn same_species(&self, left: &str, right: &str) -> bool {
        self.base_key(left) == self.base_key(right)
    }

    pub fn is_variant_id(&self, id: &str) -> bool {
        self.id_variant_markers.iter().any(|marker| id.contains(marker.as_str()))
    }

    pub fn is_bulky(&self, id: &str) -> bool {
        self.bulky_markers.iter().any(|marker| id.contains(marker.as_str()))
    }

    /// Rejects values that would break offset layout.
    pub fn check(&self) -> Result<(), String> {
        for (name, step) in
            [("offset_step", self.offset_step), ("bulky_offset_step", self.bulky_offset_step)]
        {
            if !(1..=MAX_OFFSET_STEP).contains(&step) {
                return Err(format!("{name} {step} is outside 1..={MAX_OFFSET_STEP}"));
            }
        }
        Ok(())
    }

    pub fn offset_step_for(&self, id: &str) -> i32 {
        if self.is_bulky(id) { self.bulky_offset_step } else { self.offset_step }
    }

    pub fn is_boss_tag(&self, tag: &str) -> bool {
        self.boss_tags.iter().any(|boss| boss == tag)
    }

    pub fn spawns_together(&self, tag: &str) -> bool {
        self.spawn_together_tags.iter().any(|together| together == tag)
    }

    pub fn is_aberration_id(&self, id: &str) -> bool {
        !self.aberration_prefix.is_empty() && id.starts_with(&self.aberration_prefix)
    }

    pub fn difficulty_for(&self, id: &str) -> Option<DifficultyRange> {
        self.difficulty_ranges.get(id).copied()
    }

    /// Canonical spelling of a known map name, matched case-insensitively.
    pub fn known_map(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.map_names.iter().find(|map| map.eq_ignore_ascii_case(name)).map(String::as_str)
    }

    /// Population cap for a creature. A guaranteed creature (max percentage
    /// of exactly 1) keeps its cap; anything else is scaled down and floored.
    pub fn limit_for(&self, max_percentage: f64) -> f64 {
        if max_percentage == 1.0 {
            return 1.0;
        }
        let divisor = if self.limit_divisor > 0.0 { self.limit_divisor } else { 1.0 };
        round3((max_percentage / divisor).max(self.limit_floor))
    }
}

impl Default for GenerationRules {
    fn default() -> Self {
        Self::build_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub min_spread_radius: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self { min_spread_radius: 650.0 }
    }
}

/// Rules file layout: a `[generation]` and a `[validation]` table, both
/// optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub generation: GenerationRules,
    pub validation: ValidationRules,
}

impl Rules {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let rules: Self = read_toml(path)?;
        rules
            .generation
            .check()
            .map_err(|message| LoadError::Toml { path: path.to_path_buf(), message })?;
        Ok(rules)
    }
}
