use crate::model::Offset;
use crate::rules::GenerationRules;

/// Vertical offsets for a multi-id entry: `0, a, -a, a+b, -(a+b), ...`.
///
/// The magnitude grows before every odd position by the step of the id just
/// placed, so no two offsets share a Y coordinate. Returns `None` when the
/// magnitude would leave the `i32` range.
pub fn spawn_offsets(ids: &[&str], rules: &GenerationRules) -> Option<Vec<Offset>> {
    let mut magnitude: i32 = 0;
    let mut offsets = Vec::with_capacity(ids.len());
    for (index, _) in ids.iter().enumerate() {
        let y = if index == 0 {
            0
        } else if index % 2 == 1 {
            magnitude = magnitude.checked_add(rules.offset_step_for(ids[index - 1]).max(1))?;
            magnitude
        } else {
            -magnitude
        };
        offsets.push(Offset::vertical(y));
    }
    Some(offsets)
}

/// Container class name with its last `_C` marker and every underscore
/// removed.
pub fn class_section(class_name: &str) -> String {
    let trimmed = match class_name.rfind("_C") {
        Some(at) => format!("{}{}", &class_name[..at], &class_name[at + 2..]),
        None => class_name.to_string(),
    };
    trimmed.replace('_', "")
}

pub fn entry_name(label: &str, mob_suffix: Option<&str>, class_name: &str) -> String {
    let mut name: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(suffix) = mob_suffix {
        name.push_str(suffix);
    }
    name.push_str(&class_section(class_name));
    name
}
