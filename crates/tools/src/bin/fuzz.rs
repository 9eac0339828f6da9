use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use spawn_core::synth::spawn_offsets;
use spawn_core::{
    Container, ContainerDirective, DifficultyRange, GenerationRules, SpawnEntry, SpawnLimit,
    ValidationRules, Validator, parse_container, render_container, render_document,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of random container sets to check
    #[arg(short, long, default_value_t = 1000)]
    rounds: u32,
}

const IDS: &[&str] = &[
    "Dodo_Character_BP_C",
    "Raptor_Character_BP_C",
    "Sarco_Character_BP_Aberrant_C",
    "Yutyrannus_Character_BP_C",
    "Sauropod_Character_BP_C",
    "Cherufe_Character_BP_C",
    "DA_Raptor_Character_BP_C",
];

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn upto(rng: &mut ChaCha8Rng, max: u64) -> u64 {
    rng.next_u64() % (max + 1)
}

fn random_set(rng: &mut ChaCha8Rng, round: u32, rules: &GenerationRules) -> Vec<Container> {
    let containers = 1 + upto(rng, 3);
    let mut set = Vec::new();
    for index in 0..containers {
        let mut container = Container::new(format!("DinoSpawnEntriesFuzz{round}x{index}_C"));
        container.directive = choose(rng, &[ContainerDirective::Override, ContainerDirective::Add]);

        for entry_index in 0..1 + upto(rng, 5) {
            let count = 1 + upto(rng, 4) as usize;
            let ids: Vec<&str> = (0..count).map(|_| choose(rng, IDS)).collect();
            let mut entry = SpawnEntry {
                name: format!("Fuzz{round}x{index}x{entry_index}"),
                weight: (1 + upto(rng, 999)) as f64 / 1000.0,
                color_set: choose(rng, &[String::new(), rules.color_set.clone()]),
                creature_ids: ids.iter().map(|id| id.to_string()).collect(),
                ..SpawnEntry::default()
            };
            if count > 1 {
                entry.percentages = (0..count).map(|_| upto(rng, 1000) as f64 / 1000.0).collect();
                entry.offsets = spawn_offsets(&ids, rules).unwrap_or_default();
                entry.spread_radius = Some(rules.spread_radius);
            }
            if upto(rng, 3) == 0 {
                let min_level = upto(rng, 40) as i32;
                let max_level = min_level + upto(rng, 20) as i32;
                entry.difficulty = Some(DifficultyRange { min_level, max_level });
            }
            container.entries.push(entry);
        }

        let ids: Vec<String> = container.entry_ids().iter().map(|id| id.to_string()).collect();
        for creature_id in ids {
            let max_percentage = rules.limit_for(upto(rng, 1000) as f64 / 1000.0);
            container.push_limit(SpawnLimit { creature_id, max_percentage });
        }
        set.push(container);
    }
    set
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting spawn config fuzz on seed {} for {} rounds...", args.seed, args.rounds);
    let rules = GenerationRules::default();
    let validator = Validator::new(ValidationRules::default())?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut records = 0usize;
    for round in 0..args.rounds {
        let set = random_set(&mut rng, round, &rules);

        for container in &set {
            let text = render_container(container);
            let parsed = parse_container(&text);
            if !parsed.diagnostics.is_empty() {
                bail!("Invariant failed: clean record reported {:?}: {text}", parsed.diagnostics);
            }
            if parsed.container != *container {
                bail!("Invariant failed: round trip changed record: {text}");
            }
            records += 1;
        }

        let report = validator.validate_document(&render_document(&set));
        if !report.diagnostics.is_empty() {
            bail!("Invariant failed: valid set reported {:?} in round {round}", report.diagnostics);
        }
    }

    println!("Checked {records} records without findings");
    Ok(())
}
