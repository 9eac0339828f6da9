//! Synthesis of spawn containers from a map definition.
//!
//! For each container of the map, every group is resolved into variant
//! groups and each variant group becomes one entry plus the limits of its
//! ids. Extra placements and missing creatures follow the group entries.
//! Entries whose rendered text already exists in the container are dropped,
//! and containers that end up with no entries are not emitted.

mod layout;

use std::collections::HashSet;

use crate::codec::{render_document, render_entry};
use crate::diagnostics::{Diagnostic, Finding};
use crate::grouping::{VariantGroup, resolve_groups};
use crate::model::{
    Container, ContainerDirective, ContainerSpec, CreatureRecord, CreatureSpec, GroupSpec,
    MapDefinition, SpawnEntry, SpawnLimit, round3,
};
use crate::placement::PlacementTables;
use crate::registry::Registry;
use crate::rules::GenerationRules;

pub use layout::{class_section, entry_name, spawn_offsets};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Emit additive records with minimal weights for every creature that
    /// was not requested by name.
    pub low_frequency: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMap {
    pub map_name: String,
    pub containers: Vec<Container>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedMap {
    pub fn render(&self) -> String {
        render_document(&self.containers)
    }

    /// `<MapNameWithoutSpaces>SpawnConfig.ini`.
    pub fn output_file_name(&self) -> String {
        format!("{}SpawnConfig.ini", self.map_name.replace(' ', ""))
    }
}

pub struct SpawnSynthesizer<'a> {
    rules: &'a GenerationRules,
    registry: &'a Registry,
    prepared: Registry,
    placements: &'a PlacementTables,
}

impl<'a> SpawnSynthesizer<'a> {
    pub fn new(
        rules: &'a GenerationRules,
        registry: &'a Registry,
        placements: &'a PlacementTables,
    ) -> Self {
        let prepared = registry.prepared(rules);
        Self { rules, registry, prepared, placements }
    }

    pub fn generate(&self, map: &MapDefinition, options: GenerationOptions) -> GeneratedMap {
        let missing = self.missing_creatures(map);
        let mut containers = Vec::new();
        let mut diagnostics = Vec::new();

        for spec in &map.containers {
            let mut builder = ContainerBuilder::new(&spec.class_name, options);
            self.add_groups(spec, &mut builder);
            self.add_extras(&map.map_name, &mut builder);
            for record in &missing {
                let name = &record.display_name;
                if self.placements.places_missing(name, &map.map_name, &spec.class_name) {
                    self.add_single(record, &mut builder);
                }
            }

            let (container, findings) = builder.finish();
            diagnostics.extend(findings);
            if container.entries.is_empty() {
                tracing::warn!(
                    container = %spec.class_name,
                    "no entries generated, container skipped"
                );
                continue;
            }
            tracing::debug!(
                container = %container.name,
                entries = container.entries.len(),
                limits = container.limits.len(),
                "generated container"
            );
            containers.push(container);
        }

        GeneratedMap { map_name: map.map_name.clone(), containers, diagnostics }
    }

    /// Registry records the map never names that have a placement rule on it.
    fn missing_creatures(&self, map: &MapDefinition) -> Vec<&'a CreatureRecord> {
        let named: HashSet<&str> = map
            .containers
            .iter()
            .flat_map(|container| &container.groups)
            .flat_map(|group| &group.creatures)
            .map(|creature| creature.name.as_str())
            .collect();
        self.registry
            .records()
            .iter()
            .filter(|record| !named.contains(record.display_name.as_str()))
            .filter(|record| {
                self.placements
                    .missing_rule(&record.display_name)
                    .is_some_and(|rule| rule.locations_on(&map.map_name).is_some())
            })
            .collect()
    }

    fn add_groups(&self, spec: &ContainerSpec, builder: &mut ContainerBuilder) {
        for group in &spec.groups {
            let requested = group.requested_names();
            let resolution = resolve_groups(&requested, &self.prepared, self.rules);
            for finding in resolution.findings {
                builder.report(finding);
            }
            if resolution.groups.is_empty() {
                builder.report(Finding::EmptyGroup);
                continue;
            }
            let share = resolution.groups.len();
            for variant in &resolution.groups {
                self.add_variant(group, variant, share, &requested, builder);
            }
        }
    }

    fn add_extras(&self, map_name: &str, builder: &mut ContainerBuilder) {
        for name in self.placements.extras_for(map_name, &builder.container.name) {
            match self.registry.find(name) {
                Some(record) => self.add_single(record, builder),
                None => builder.report(Finding::UnknownCreature { name: name.clone() }),
            }
        }
    }

    /// A lone record weighted by its own default max percentage.
    fn add_single(&self, record: &CreatureRecord, builder: &mut ContainerBuilder) {
        let group = GroupSpec {
            weight: record.default_max_percentage,
            creatures: vec![
                CreatureSpec::new(record.display_name.clone())
                    .with_percentages(&[record.default_max_percentage]),
            ],
        };
        let variant = VariantGroup { records: vec![record.clone()] };
        self.add_variant(&group, &variant, 1, &[record.display_name.as_str()], builder);
    }

    fn add_variant(
        &self,
        group: &GroupSpec,
        variant: &VariantGroup,
        share: usize,
        requested: &[&str],
        builder: &mut ContainerBuilder,
    ) {
        let rules = self.rules;
        let class_name = builder.container.name.clone();
        let low_frequency = builder.options.low_frequency;
        let requested_here = variant.contains_requested(requested);

        let mut ids: Vec<&str> = Vec::new();
        let mut percentages: Vec<f64> = Vec::new();
        for creature in &group.creatures {
            let chances: &[f64] =
                if creature.percentages.is_empty() { &[1.0] } else { &creature.percentages };
            for &chance in chances {
                for record in &variant.records {
                    if rules.same_species(&record.display_name, &creature.name) {
                        ids.push(&record.id);
                        percentages.push(round3(chance));
                    }
                }
            }
        }
        if ids.is_empty() {
            builder.report(Finding::EmptyGroup);
            return;
        }

        let mut weight = if !low_frequency {
            round3(group.weight / share as f64)
        } else if requested_here {
            group.weight
        } else {
            rules.low_frequency_weight
        };

        let mut limits = Vec::new();
        for record in &variant.records {
            let mut max_percentage = if low_frequency && !requested_here {
                rules.low_frequency_max_percentage
            } else {
                record.default_max_percentage
            };
            let compact_name: String =
                record.display_name.chars().filter(|c| !c.is_whitespace()).collect();
            if !compact_name.is_empty() && class_name.contains(&compact_name) {
                max_percentage = 1.0;
                weight = 1.0;
            }
            limits.push(SpawnLimit {
                creature_id: record.id.clone(),
                max_percentage: rules.limit_for(max_percentage),
            });
        }

        let mut names: Vec<&str> = Vec::new();
        for record in &variant.records {
            if !names.contains(&record.display_name.as_str()) {
                names.push(&record.display_name);
            }
        }
        let label = names.concat();
        let is_mob = ids.len() > 1
            || group.creatures.len() > 1
            || group.creatures.iter().any(|creature| creature.percentages.len() > 1);
        let suffix = is_mob.then_some(rules.mob_suffix.as_str());

        let mut entry = SpawnEntry {
            name: entry_name(&label, suffix, &class_name),
            weight,
            color_set: rules.color_set.clone(),
            creature_ids: ids.iter().map(|id| id.to_string()).collect(),
            difficulty: rules.difficulty_for(ids[0]),
            ..SpawnEntry::default()
        };
        if ids.len() > 1 {
            let Some(offsets) = spawn_offsets(&ids, rules) else {
                builder.report(Finding::OffsetOverflow { ids: ids.len() });
                return;
            };
            entry.offsets = offsets;
            entry.percentages = percentages;
            entry.spread_radius = Some(rules.spread_radius);
        }
        builder.push(entry, limits);
    }
}

struct ContainerBuilder {
    container: Container,
    options: GenerationOptions,
    rendered: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ContainerBuilder {
    fn new(class_name: &str, options: GenerationOptions) -> Self {
        let mut container = Container::new(class_name);
        if options.low_frequency {
            container.directive = ContainerDirective::Add;
        }
        Self { container, options, rendered: HashSet::new(), diagnostics: Vec::new() }
    }

    fn report(&mut self, finding: Finding) {
        if let Finding::UnknownCreature { name } = &finding {
            tracing::warn!(
                container = %self.container.name,
                creature = %name,
                "unknown creature skipped"
            );
        }
        self.diagnostics.push(Diagnostic::container(&self.container.name, finding));
    }

    fn push(&mut self, entry: SpawnEntry, limits: Vec<SpawnLimit>) {
        if !self.rendered.insert(render_entry(&entry)) {
            tracing::debug!(entry = %entry.name, "identical entry dropped");
            return;
        }
        self.container.entries.push(entry);
        for limit in limits {
            self.container.push_limit(limit);
        }
    }

    fn finish(self) -> (Container, Vec<Diagnostic>) {
        (self.container, self.diagnostics)
    }
}
