//! Canonical rendering of the structural model.

use crate::model::{Container, SpawnEntry, SpawnLimit};

use super::fields;

pub fn render_container(container: &Container) -> String {
    let entries: Vec<String> = container.entries.iter().map(render_entry).collect();
    let limits: Vec<String> = container.limits.iter().map(render_limit).collect();
    format!(
        "{}=({}=\"{}\",{}=({}),{}=({}))",
        container.directive.key(),
        fields::CLASS_STRING,
        container.name,
        fields::ENTRIES,
        entries.join(","),
        fields::LIMITS,
        limits.join(","),
    )
}

/// One record per line, each line terminated.
pub fn render_document(containers: &[Container]) -> String {
    let mut out = String::new();
    for container in containers {
        out.push_str(&render_container(container));
        out.push('\n');
    }
    out
}

pub fn render_entry(entry: &SpawnEntry) -> String {
    let mut parts = vec![format!("{}=\"{}\"", fields::ENTRY_NAME, entry.name)];
    if !entry.color_set.is_empty() {
        parts.push(format!("{}=\"{}\"", fields::COLOR_SETS, entry.color_set));
    }
    if !entry.percentages.is_empty() {
        let values: Vec<String> = entry.percentages.iter().map(f64::to_string).collect();
        parts.push(format!("{}=({})", fields::PERCENTAGES, values.join(",")));
    }
    if let Some(radius) = entry.spread_radius {
        parts.push(format!("{}={radius}", fields::SPREAD_RADIUS));
    }
    if !entry.offsets.is_empty() {
        let offsets: Vec<String> = entry
            .offsets
            .iter()
            .map(|offset| format!("(X={},Y={},Z={})", offset.x, offset.y, offset.z))
            .collect();
        parts.push(format!("{}=({})", fields::OFFSETS, offsets.join(",")));
    }
    parts.push(format!("{}={}", fields::WEIGHT, entry.weight));
    let ids: Vec<String> = entry.creature_ids.iter().map(|id| format!("\"{id}\"")).collect();
    parts.push(format!("{}=({})", fields::SPAWN_STRINGS, ids.join(",")));
    if let Some(range) = entry.difficulty {
        parts.push(format!(
            "{}=(({}=({}),{}=({}),{}=(0)))",
            fields::DIFFICULTY,
            fields::LEVELS_MIN,
            range.min_level,
            fields::LEVELS_MAX,
            range.max_level,
            fields::GAME_DIFFICULTIES,
        ));
    }
    format!("({})", parts.join(","))
}

pub fn render_limit(limit: &SpawnLimit) -> String {
    format!(
        "({}=\"{}\",{}={})",
        fields::LIMIT_CLASS,
        limit.creature_id,
        fields::LIMIT_MAX,
        limit.max_percentage
    )
}
