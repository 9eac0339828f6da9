//! Resolution of requested creature names into variant groups.
//!
//! Each variant group becomes one generated entry. Which of the two policies
//! applies is decided from the requested names and the tags of the records
//! they resolve to.

use crate::diagnostics::Finding;
use crate::model::CreatureRecord;
use crate::registry::Registry;
use crate::rules::GenerationRules;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupingPolicy {
    /// One group per concrete id, or a single shared group when the records
    /// span several species or spawn together.
    Generic,
    /// One boss paired with one minion per group.
    Paired,
}

impl GroupingPolicy {
    pub fn select(
        requested: &[&str],
        candidates: &[CreatureRecord],
        rules: &GenerationRules,
    ) -> Self {
        let together = !candidates.is_empty()
            && candidates.iter().all(|record| rules.spawns_together(&record.species_tag));
        if requested.len() > 1 && !together { Self::Paired } else { Self::Generic }
    }

    pub fn resolve(
        self,
        candidates: Vec<CreatureRecord>,
        rules: &GenerationRules,
    ) -> (Vec<VariantGroup>, Vec<Finding>) {
        match self {
            Self::Generic => (resolve_generic(candidates, rules), Vec::new()),
            Self::Paired => resolve_paired(candidates, rules),
        }
    }
}

/// Records emitted together as one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantGroup {
    pub records: Vec<CreatureRecord>,
}

impl VariantGroup {
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.id.as_str()).collect()
    }

    /// Whether any record is literally one of the requested creatures rather
    /// than a variant found through its base key.
    pub fn contains_requested(&self, requested: &[&str]) -> bool {
        self.records.iter().any(|record| requested.contains(&record.display_name.as_str()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub policy: GroupingPolicy,
    pub groups: Vec<VariantGroup>,
    pub findings: Vec<Finding>,
}

/// Resolves `requested` against a prepared registry.
pub fn resolve_groups(
    requested: &[&str],
    registry: &Registry,
    rules: &GenerationRules,
) -> Resolution {
    let mut findings: Vec<Finding> = requested
        .iter()
        .filter(|&&name| registry.variants_of(&[name], rules).is_empty())
        .map(|name| Finding::UnknownCreature { name: name.to_string() })
        .collect();

    let candidates = registry.variants_of(requested, rules);
    let policy = GroupingPolicy::select(requested, &candidates, rules);
    let (groups, policy_findings) = policy.resolve(candidates, rules);
    findings.extend(policy_findings);

    tracing::debug!(?requested, ?policy, groups = groups.len(), "resolved variant groups");
    Resolution { policy, groups, findings }
}

fn resolve_generic(candidates: Vec<CreatureRecord>, rules: &GenerationRules) -> Vec<VariantGroup> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let mut tags: Vec<&str> = candidates.iter().map(|record| record.species_tag.as_str()).collect();
    tags.sort_unstable();
    tags.dedup();
    if tags.len() > 1 || tags.iter().any(|tag| rules.spawns_together(tag)) {
        return vec![VariantGroup { records: candidates }];
    }

    let mut groups: Vec<VariantGroup> = Vec::new();
    for record in candidates {
        match groups.iter_mut().find(|group| group.records[0].id == record.id) {
            Some(group) => group.records.push(record),
            None => groups.push(VariantGroup { records: vec![record] }),
        }
    }
    groups
}

fn resolve_paired(
    candidates: Vec<CreatureRecord>,
    rules: &GenerationRules,
) -> (Vec<VariantGroup>, Vec<Finding>) {
    let (mut bosses, mut minions): (Vec<CreatureRecord>, Vec<CreatureRecord>) =
        candidates.into_iter().partition(|record| rules.is_boss_tag(&record.species_tag));
    if bosses.is_empty() && !minions.is_empty() {
        bosses.push(minions.remove(0));
    }
    minions.retain(|record| !rules.excluded_minion_ids.contains(&record.id));

    let mut groups = Vec::with_capacity(bosses.len());
    let mut findings = Vec::new();
    for boss in bosses {
        let aberration = rules.is_aberration_id(&boss.id);
        let minion = minions.iter().find(|minion| rules.is_aberration_id(&minion.id) == aberration);
        match minion {
            Some(minion) => groups.push(VariantGroup { records: vec![boss, minion.clone()] }),
            None => {
                tracing::warn!(boss = %boss.id, "no matching minion, boss emitted alone");
                findings.push(Finding::UnpairedBoss { boss_id: boss.id.clone() });
                groups.push(VariantGroup { records: vec![boss] });
            }
        }
    }
    (groups, findings)
}
