//! Read-only creature registry and its preparation for grouping.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::ingest::parse_creature_list;
use crate::loader::{LoadError, read_json, read_text, write_json};
use crate::model::CreatureRecord;
use crate::rules::GenerationRules;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    records: Vec<CreatureRecord>,
}

impl Registry {
    pub fn new(records: Vec<CreatureRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CreatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads a JSON registry, or a flat `Name,Tag,Id` list for any other
    /// extension.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::load_json(path)
        } else {
            Self::load_creature_list(path)
        }
    }

    pub fn load_json(path: &Path) -> Result<Self, LoadError> {
        read_json(path).map(Self::new)
    }

    pub fn load_creature_list(path: &Path) -> Result<Self, LoadError> {
        let text = read_text(path)?;
        parse_creature_list(&text).map(Self::new).map_err(|error| LoadError::Invalid {
            path: path.to_path_buf(),
            line: error.line,
            message: error.message,
        })
    }

    pub fn save_json(&self, path: &Path) -> Result<(), LoadError> {
        write_json(path, &self.records)
    }

    /// First record with exactly this display name.
    pub fn find(&self, display_name: &str) -> Option<&CreatureRecord> {
        self.records.iter().find(|record| record.display_name == display_name)
    }

    /// Every record of the same species as any of `names`, in registry order.
    pub fn variants_of(&self, names: &[&str], rules: &GenerationRules) -> Vec<CreatureRecord> {
        let keys: Vec<String> = names.iter().map(|name| rules.base_key(name)).collect();
        self.records
            .iter()
            .filter(|record| keys.contains(&rules.base_key(&record.display_name)))
            .cloned()
            .collect()
    }

    /// The registry as grouping sees it: problem-species variants dropped,
    /// plain records dropped where variants replace them, ordered by tag.
    pub fn prepared(&self, rules: &GenerationRules) -> Self {
        let problem_ids: HashSet<&str> = self
            .records
            .iter()
            .filter(|record| {
                rules.problem_species.contains(&record.species_tag)
                    && rules.id_variant_markers.iter().any(|marker| {
                        *marker != rules.problem_exempt_marker
                            && record.id.contains(marker.as_str())
                    })
            })
            .map(|record| record.id.as_str())
            .collect();

        let remaining: Vec<&CreatureRecord> = self
            .records
            .iter()
            .filter(|record| !problem_ids.contains(record.id.as_str()))
            .collect();

        let mut by_tag: BTreeMap<&str, Vec<&CreatureRecord>> = BTreeMap::new();
        for record in &remaining {
            if !rules.keep_basic.contains(&record.display_name) {
                by_tag.entry(record.species_tag.as_str()).or_default().push(record);
            }
        }
        let basic_ids: HashSet<&str> = by_tag
            .values()
            .filter(|group| {
                group.len() > 1 && group.iter().any(|record| rules.is_variant_id(&record.id))
            })
            .flatten()
            .filter(|record| !rules.is_variant_id(&record.id))
            .map(|record| record.id.as_str())
            .collect();

        let mut records: Vec<CreatureRecord> = remaining
            .into_iter()
            .filter(|record| !basic_ids.contains(record.id.as_str()))
            .cloned()
            .collect();
        records.sort_by(|left, right| left.species_tag.cmp(&right.species_tag));

        tracing::debug!(
            total = self.records.len(),
            problem = problem_ids.len(),
            basic = basic_ids.len(),
            kept = records.len(),
            "prepared registry"
        );
        Self { records }
    }
}
