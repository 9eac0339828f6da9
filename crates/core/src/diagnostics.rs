//! Findings reported by parsing, validation and generation.
//!
//! Nothing in this crate aborts on bad input. Every defect becomes a
//! [`Diagnostic`] and processing moves on to the next field, entry or
//! container.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Which per-id list of a multi-creature entry disagrees with the id list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MobField {
    Percentages,
    Offsets,
}

impl MobField {
    fn describe(self) -> &'static str {
        match self {
            Self::Percentages => "% chance values",
            Self::Offsets => "offset values",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Finding {
    UnbalancedDelimiters { open: usize, close: usize },
    ConsecutiveSeparators,
    IrregularSeparatorSequence,
    EmptyDelimiterPair,
    UnterminatedString,
    /// A record or sub-record that does not carry the field identifying it.
    UnrecognizedRecord { context: &'static str },
    MissingField { field: &'static str },
    EmptyField { field: &'static str },
    InvalidValue { field: &'static str, value: String },
    DuplicateContainer,
    DuplicateEntry,
    MissingLimits { ids: Vec<String> },
    OrphanLimits { ids: Vec<String> },
    LengthMismatch { field: MobField, ids: usize, values: usize },
    OffsetCollision { ys: Vec<i32> },
    /// Offset steps too large to lay out this many spawn strings.
    OffsetOverflow { ids: usize },
    PercentageOutOfBounds { values: Vec<f64> },
    SpreadRadiusBelowFloor { radius: f64, floor: f64 },
    MissingSpreadRadius,
    MobFieldsOnSingleSpawn,
    InvertedDifficultyRange { min_level: i32, max_level: i32 },
    NegativeLimit { creature_id: String, value: f64 },
    UnknownCreature { name: String },
    UnpairedBoss { boss_id: String },
    EmptyGroup,
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Self::SpreadRadiusBelowFloor { .. }
            | Self::MissingSpreadRadius
            | Self::MobFieldsOnSingleSpawn
            | Self::UnknownCreature { .. }
            | Self::UnpairedBoss { .. }
            | Self::EmptyGroup => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

fn join(ids: &[String]) -> String {
    ids.join(", ")
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedDelimiters { open, close } => {
                write!(f, "mismatched parentheses ({open} open, {close} close)")
            }
            Self::ConsecutiveSeparators => write!(f, "consecutive commas"),
            Self::IrregularSeparatorSequence => {
                write!(f, "irregular comma/parentheses sequence")
            }
            Self::EmptyDelimiterPair => write!(f, "empty parentheses sequence"),
            Self::UnterminatedString => write!(f, "unterminated quoted string"),
            Self::UnrecognizedRecord { context } => {
                write!(f, "unrecognized {context} record")
            }
            Self::MissingField { field } => write!(f, "{field} is missing"),
            Self::EmptyField { field } => write!(f, "{field} doesn't contain a valid value"),
            Self::InvalidValue { field, value } => {
                write!(f, "{field} has an unreadable value `{value}`")
            }
            Self::DuplicateContainer => write!(f, "duplicate container id"),
            Self::DuplicateEntry => write!(f, "duplicate spawn entry id"),
            Self::MissingLimits { ids } => write!(f, "missing limit matches: {}", join(ids)),
            Self::OrphanLimits { ids } => write!(f, "missing entry matches: {}", join(ids)),
            Self::LengthMismatch { field, ids, values } => {
                let more = if ids > values {
                    format!("spawn strings than {}", field.describe())
                } else {
                    format!("{} than spawn strings", field.describe())
                };
                write!(f, "has more {more} ({ids} ids, {values} values)")
            }
            Self::OffsetCollision { ys } => {
                let ys: Vec<String> = ys.iter().map(i32::to_string).collect();
                write!(f, "has matching offset Y coords ({})", ys.join(", "))
            }
            Self::OffsetOverflow { ids } => {
                write!(f, "offsets for {ids} spawn strings overflow, no entry produced")
            }
            Self::PercentageOutOfBounds { values } => {
                let values: Vec<String> = values.iter().map(f64::to_string).collect();
                write!(
                    f,
                    "has spawn percent chance outside 0..=1 ({}); valid values are decimals between 0 and 1",
                    values.join(", ")
                )
            }
            Self::SpreadRadiusBelowFloor { radius, floor } => {
                write!(f, "spawn radius {radius} is lower than {floor}, this is not recommended")
            }
            Self::MissingSpreadRadius => write!(f, "mob entry has no spawn radius"),
            Self::MobFieldsOnSingleSpawn => {
                write!(f, "contains mob spawn info, but only one spawn string")
            }
            Self::InvertedDifficultyRange { min_level, max_level } => {
                write!(f, "difficulty range min {min_level} exceeds max {max_level}")
            }
            Self::NegativeLimit { creature_id, value } => {
                write!(f, "limit for {creature_id} is negative ({value})")
            }
            Self::UnknownCreature { name } => {
                write!(f, "no registry record for creature `{name}`, skipped")
            }
            Self::UnpairedBoss { boss_id } => {
                write!(f, "no matching minion for boss {boss_id}, emitted alone")
            }
            Self::EmptyGroup => write!(f, "group resolved to no creatures, no entry produced"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub container: String,
    pub entry: Option<String>,
    pub finding: Finding,
}

impl Diagnostic {
    pub fn container(container: &str, finding: Finding) -> Self {
        Self {
            severity: finding.severity(),
            container: container.to_string(),
            entry: None,
            finding,
        }
    }

    pub fn entry(container: &str, entry: &str, finding: Finding) -> Self {
        let entry = if entry.is_empty() { None } else { Some(entry.to_string()) };
        Self { severity: finding.severity(), container: container.to_string(), entry, finding }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let container = if self.container.is_empty() { "<unnamed>" } else { &self.container };
        match &self.entry {
            Some(entry) => {
                write!(f, "[{}] {container} entry {entry}: {}", self.severity, self.finding)
            }
            None => write!(f, "[{}] {container}: {}", self.severity, self.finding),
        }
    }
}
