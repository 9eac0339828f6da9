use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use spawn_core::synth::spawn_offsets;
use spawn_core::{
    Container, ContainerDirective, DifficultyRange, GenerationRules, SpawnEntry, SpawnLimit,
    ValidationRules, Validator, parse_container, render_container, render_document,
};

const IDS: &[&str] = &[
    "Dodo_Character_BP_C",
    "Raptor_Character_BP_C",
    "Sarco_Character_BP_Aberrant_C",
    "Yutyrannus_Character_BP_C",
    "Sauropod_Character_BP_C",
    "DA_Raptor_Character_BP_C",
];

fn below(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

fn thousandths(rng: &mut ChaCha8Rng, min: u64) -> f64 {
    (min + below(rng, 1001 - min)) as f64 / 1000.0
}

fn random_entry(rng: &mut ChaCha8Rng, name: String, rules: &GenerationRules) -> SpawnEntry {
    let count = 1 + below(rng, 4) as usize;
    let ids: Vec<&str> = (0..count).map(|_| IDS[below(rng, IDS.len() as u64) as usize]).collect();
    let mut entry = SpawnEntry {
        name,
        weight: thousandths(rng, 1),
        color_set: if below(rng, 3) == 0 { String::new() } else { rules.color_set.clone() },
        creature_ids: ids.iter().map(|id| id.to_string()).collect(),
        ..SpawnEntry::default()
    };
    if count > 1 {
        entry.percentages = (0..count).map(|_| thousandths(rng, 0)).collect();
        entry.offsets = spawn_offsets(&ids, rules).unwrap_or_default();
        entry.spread_radius = Some(650.0 + 50.0 * below(rng, 5) as f64);
    }
    if below(rng, 4) == 0 {
        let min_level = below(rng, 30) as i32;
        let max_level = min_level + below(rng, 20) as i32;
        entry.difficulty = Some(DifficultyRange { min_level, max_level });
    }
    entry
}

fn random_containers(seed: u64) -> Vec<Container> {
    let rules = GenerationRules::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = 1 + below(&mut rng, 3) as usize;
    (0..count)
        .map(|index| {
            let mut container = Container::new(format!("DinoSpawnEntriesZone{index}_C"));
            if below(&mut rng, 2) == 0 {
                container.directive = ContainerDirective::Add;
            }
            let entries = 1 + below(&mut rng, 4) as usize;
            for entry_index in 0..entries {
                let name = format!("Entry{index}x{entry_index}");
                container.entries.push(random_entry(&mut rng, name, &rules));
            }
            let ids: Vec<String> = container.entry_ids().iter().map(|id| id.to_string()).collect();
            for creature_id in ids {
                let max_percentage = thousandths(&mut rng, 0);
                container.push_limit(SpawnLimit { creature_id, max_percentage });
            }
            container
        })
        .collect()
}

fn check_round_trip(seed: u64) -> Result<(), String> {
    for container in random_containers(seed) {
        let text = render_container(&container);
        let parsed = parse_container(&text);
        if !parsed.diagnostics.is_empty() {
            return Err(format!("seed {seed}: parse reported {:?} for {text}", parsed.diagnostics));
        }
        if parsed.container != container {
            return Err(format!("seed {seed}: round trip changed {text}"));
        }
    }
    Ok(())
}

fn check_idempotent_validation(seed: u64) -> Result<(), String> {
    let validator = Validator::new(ValidationRules::default()).map_err(|e| e.to_string())?;
    let containers = random_containers(seed);
    let first = validator.validate_document(&render_document(&containers));
    if !first.diagnostics.is_empty() {
        return Err(format!("seed {seed}: valid set reported {:?}", first.diagnostics));
    }
    let second = validator.validate_document(&render_document(&first.containers));
    if !second.diagnostics.is_empty() || second.containers != containers {
        return Err(format!("seed {seed}: revalidation diverged"));
    }
    Ok(())
}

#[test]
fn parse_of_render_reproduces_container() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    runner
        .run(&any::<u64>(), |seed| {
            check_round_trip(seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("rendered containers should parse back unchanged");
}

#[test]
fn revalidating_valid_sets_is_clean() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    runner
        .run(&any::<u64>(), |seed| {
            check_idempotent_validation(seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("valid container sets should validate without findings");
}

#[test]
fn multi_id_entries_keep_parallel_lists_and_distinct_heights() {
    for seed in 0..32 {
        for container in random_containers(seed) {
            for entry in container.entries.iter().filter(|entry| entry.is_mob()) {
                assert_eq!(entry.percentages.len(), entry.creature_ids.len());
                assert_eq!(entry.offsets.len(), entry.creature_ids.len());
                let mut ys: Vec<i32> = entry.offsets.iter().map(|offset| offset.y).collect();
                ys.sort_unstable();
                ys.dedup();
                assert_eq!(ys.len(), entry.offsets.len(), "seed {seed}: {}", entry.name);
            }
        }
    }
}
