pub mod codec;
pub mod diagnostics;
pub mod grouping;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod placement;
pub mod registry;
pub mod rules;
pub mod synth;
pub mod validate;

pub use codec::{
    ParsedContainer, ParsedDocument, RecordScanner, parse_container, render_container,
    render_document,
};
pub use diagnostics::{Diagnostic, Finding, Severity};
pub use grouping::{GroupingPolicy, Resolution, VariantGroup, resolve_groups};
pub use ingest::{
    IngestError, find_map, load_map_definitions, parse_creature_list, parse_map_definitions,
    save_map_definitions,
};
pub use loader::LoadError;
pub use model::*;
pub use placement::PlacementTables;
pub use registry::Registry;
pub use rules::{GenerationRules, Rules, ValidationRules};
pub use synth::{GeneratedMap, GenerationOptions, SpawnSynthesizer};
pub use validate::{ValidationReport, Validator};
