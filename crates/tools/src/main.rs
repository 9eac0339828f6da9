use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use spawn_core::{
    Diagnostic, GenerationOptions, PlacementTables, Registry, Rules, SpawnSynthesizer, Validator,
    find_map, load_map_definitions, save_map_definitions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Validate and generate spawn container configs",
    long_about = None
)]
struct Cli {
    /// Directory that relative input paths resolve against when they do not
    /// exist as given. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every container record of a config file
    Validate {
        /// Config file to check
        #[arg(short, long, conflicts_with = "map")]
        file: Option<PathBuf>,
        /// Map whose generated config file should be checked
        #[arg(short, long)]
        map: Option<String>,
        /// Directory holding generated config files
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// TOML rules file
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Generate the config file of one map
    Generate {
        #[arg(short, long)]
        map: String,
        /// Map definitions, JSON or text
        #[arg(long, default_value = "SpawnEntries.json")]
        maps: PathBuf,
        /// Creature registry, JSON or flat list
        #[arg(long, default_value = "CreatureIDs.json")]
        registry: PathBuf,
        /// Missing-creature placement table (JSON)
        #[arg(long)]
        missing: Option<PathBuf>,
        /// Extra placement table (JSON), replacing the built-in one
        #[arg(long)]
        extras: Option<PathBuf>,
        /// TOML rules file
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Emit additive records with minimal weights for unrequested variants
        #[arg(long)]
        low_frequency: bool,
        #[arg(short, long)]
        out_dir: PathBuf,
    },
    /// Convert a flat `Name,Tag,Id` list into the JSON registry
    ConvertRegistry {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert text map definitions into JSON
    ConvertMaps {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match cli.command {
        Command::Validate { file, map, dir, rules } => {
            let path = match (file, map) {
                (Some(file), _) => resolve(&data_dir, &file),
                (None, Some(map)) => dir
                    .unwrap_or_else(|| data_dir.clone())
                    .join(format!("{}SpawnConfig.ini", map.replace(' ', ""))),
                (None, None) => return Err(anyhow!("either --file or --map is required")),
            };
            let rules = load_rules(&data_dir, rules.as_deref())?;
            validate(&path, &rules)
        }
        Command::Generate {
            map,
            maps,
            registry,
            missing,
            extras,
            rules,
            low_frequency,
            out_dir,
        } => {
            let rules = load_rules(&data_dir, rules.as_deref())?;
            let maps_path = resolve(&data_dir, &maps);
            let maps = load_map_definitions(&maps_path, &rules.generation).with_context(|| {
                format!("Failed to load map definitions: {}", maps_path.display())
            })?;
            let map = find_map(&maps, &map).ok_or_else(|| {
                let known: Vec<&str> = maps.iter().map(|m| m.map_name.as_str()).collect();
                anyhow!("Map `{map}` not found; known maps: {}", known.join(", "))
            })?;

            let registry_path = resolve(&data_dir, &registry);
            let registry = Registry::load(&registry_path)
                .with_context(|| format!("Failed to load registry: {}", registry_path.display()))?;

            let mut placements = PlacementTables::default();
            if let Some(path) = missing {
                let path = resolve(&data_dir, &path);
                placements = placements.with_missing_file(&path).with_context(|| {
                    format!("Failed to load missing creatures: {}", path.display())
                })?;
            }
            if let Some(path) = extras {
                let path = resolve(&data_dir, &path);
                placements = placements.with_extra_file(&path).with_context(|| {
                    format!("Failed to load extra placements: {}", path.display())
                })?;
            }

            let generated = SpawnSynthesizer::new(&rules.generation, &registry, &placements)
                .generate(map, GenerationOptions { low_frequency });
            print_diagnostics(&generated.diagnostics);

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;
            let out_path = out_dir.join(generated.output_file_name());
            fs::write(&out_path, generated.render())
                .with_context(|| format!("Failed to write config: {}", out_path.display()))?;
            tracing::info!(
                path = %out_path.display(),
                containers = generated.containers.len(),
                "wrote spawn config"
            );
            println!("Wrote {} containers to {}", generated.containers.len(), out_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::ConvertRegistry { input, output } => {
            let input = resolve(&data_dir, &input);
            let registry = Registry::load_creature_list(&input)
                .with_context(|| format!("Failed to read creature list: {}", input.display()))?;
            registry
                .save_json(&output)
                .with_context(|| format!("Failed to write registry: {}", output.display()))?;
            println!("Converted {} creatures into {}", registry.len(), output.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::ConvertMaps { input, output, rules } => {
            let rules = load_rules(&data_dir, rules.as_deref())?;
            let input = resolve(&data_dir, &input);
            let maps = load_map_definitions(&input, &rules.generation)
                .with_context(|| format!("Failed to read map definitions: {}", input.display()))?;
            save_map_definitions(&output, &maps)
                .with_context(|| format!("Failed to write map definitions: {}", output.display()))?;
            println!("Converted {} maps into {}", maps.len(), output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "spawncfg")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Paths that exist as given are used as is; other relative paths resolve
/// against the data directory.
fn resolve(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() { path.to_path_buf() } else { data_dir.join(path) }
}

fn load_rules(data_dir: &Path, path: Option<&Path>) -> Result<Rules> {
    match path {
        Some(path) => {
            let path = resolve(data_dir, path);
            Rules::load(&path).with_context(|| format!("Failed to load rules: {}", path.display()))
        }
        None => Ok(Rules::default()),
    }
}

fn validate(path: &Path, rules: &Rules) -> Result<ExitCode> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let validator = Validator::new(rules.validation.clone())?;
    let report = validator.validate_document(&text);

    print_diagnostics(&report.diagnostics);
    println!(
        "{} containers checked: {} errors, {} warnings",
        report.containers.len(),
        report.error_count(),
        report.warning_count()
    );
    if report.has_errors() { Ok(ExitCode::FAILURE) } else { Ok(ExitCode::SUCCESS) }
}

/// Prints diagnostics grouped by container, containers in first-seen order.
fn print_diagnostics(diagnostics: &[Diagnostic]) {
    let mut containers: Vec<&str> = Vec::new();
    for diagnostic in diagnostics {
        if !containers.contains(&diagnostic.container.as_str()) {
            containers.push(&diagnostic.container);
        }
    }
    for container in containers {
        let heading = if container.is_empty() { "<unnamed container>" } else { container };
        println!("{heading}");
        for diagnostic in diagnostics.iter().filter(|d| d.container == container) {
            match &diagnostic.entry {
                Some(entry) => {
                    println!("  [{}] {entry}: {}", diagnostic.severity, diagnostic.finding)
                }
                None => println!("  [{}] {}", diagnostic.severity, diagnostic.finding),
            }
        }
    }
}
