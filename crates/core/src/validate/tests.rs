use super::*;
use crate::codec::{parse_container, render_container};
use crate::model::{DifficultyRange, Offset, SpawnLimit};

const BEACH: &str = r#"ConfigOverrideNPCSpawnEntriesContainer=(NPCSpawnEntriesContainerClassString="DinoSpawnEntriesBeach_C",NPCSpawnEntries=((AnEntryName="Test_C",ColorSets="X",EntryWeight=1,NPCsToSpawnStrings=("A_C"))),NPCSpawnLimits=((NPCClassString="A_C",MaxPercentageOfDesiredNumToAllow=0.3)))"#;

fn validator() -> Validator {
    Validator::new(ValidationRules::default()).expect("validator patterns")
}

fn findings(diagnostics: &[Diagnostic]) -> Vec<&Finding> {
    diagnostics.iter().map(|d| &d.finding).collect()
}

fn mob_entry(name: &str) -> SpawnEntry {
    SpawnEntry {
        name: name.to_string(),
        weight: 0.5,
        color_set: "DinoColorSet_AllColors_C".to_string(),
        creature_ids: vec!["A_C".to_string(), "B_C".to_string()],
        percentages: vec![1.0, 0.5],
        offsets: vec![Offset::ORIGIN, Offset::vertical(400)],
        spread_radius: Some(650.0),
        difficulty: None,
    }
}

fn container_with(entries: Vec<SpawnEntry>) -> Container {
    let mut container = Container::new("DinoSpawnEntriesSwamp_C");
    for id in ["A_C", "B_C"] {
        container.push_limit(SpawnLimit { creature_id: id.to_string(), max_percentage: 0.03 });
    }
    container.entries = entries;
    container
}

#[test]
fn single_spawn_record_is_clean() {
    let report = validator().validate_document(BEACH);
    assert_eq!(report.containers.len(), 1);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert!(!report.has_errors());
}

#[test]
fn limit_above_one_is_reported_without_clamping() {
    let text = BEACH.replace("=0.3", "=1.5");
    let report = validator().validate_document(&text);
    assert_eq!(report.containers[0].limits[0].max_percentage, 1.5);
    assert_eq!(
        findings(&report.diagnostics),
        vec![&Finding::PercentageOutOfBounds { values: vec![1.5] }]
    );
}

#[test]
fn negative_limit_is_reported() {
    let text = BEACH.replace("=0.3", "=-0.1");
    let report = validator().validate_document(&text);
    assert!(report.diagnostics.iter().any(|d| matches!(
        d.finding,
        Finding::NegativeLimit { ref creature_id, value } if creature_id == "A_C" && value == -0.1
    )));
}

#[test]
fn syntax_checks_run_on_raw_text() {
    let validator = validator();
    let unbalanced = validator.check_syntax("Beach_C", "X=((a=1)");
    assert_eq!(findings(&unbalanced), vec![&Finding::UnbalancedDelimiters { open: 2, close: 1 }]);

    let messy = validator.check_syntax("Beach_C", "X=(a=1,,b=(),c=(1),)");
    let found = findings(&messy);
    assert!(found.contains(&&Finding::ConsecutiveSeparators));
    assert!(found.contains(&&Finding::IrregularSeparatorSequence));
    assert!(found.contains(&&Finding::EmptyDelimiterPair));

    assert!(validator.check_syntax("Beach_C", BEACH).is_empty());
}

#[test]
fn duplicate_names_reported_across_the_set() {
    let first = parse_container(BEACH).container;
    let second = parse_container(BEACH).container;
    let diagnostics = validator().validate_containers(&[first, second]);
    let found = findings(&diagnostics);
    assert_eq!(found.iter().filter(|f| ***f == Finding::DuplicateContainer).count(), 1);
    assert_eq!(found.iter().filter(|f| ***f == Finding::DuplicateEntry).count(), 1);
}

#[test]
fn cross_references_reported_in_both_directions() {
    let mut container = parse_container(BEACH).container;
    container.entries[0].creature_ids = vec!["B_C".to_string()];
    let diagnostics = validator().validate_container(&container);
    assert_eq!(
        findings(&diagnostics),
        vec![
            &Finding::MissingLimits { ids: vec!["B_C".to_string()] },
            &Finding::OrphanLimits { ids: vec!["A_C".to_string()] },
        ]
    );
}

#[test]
fn well_formed_mob_entry_is_clean() {
    let container = container_with(vec![mob_entry("ABMob")]);
    assert!(validator().validate_container(&container).is_empty());
}

#[test]
fn mob_length_mismatch_names_field_and_direction() {
    let mut entry = mob_entry("ABMob");
    entry.percentages.push(0.2);
    entry.offsets.pop();
    let diagnostics = validator().validate_container(&container_with(vec![entry]));
    let messages: Vec<String> = diagnostics.iter().map(|d| d.finding.to_string()).collect();
    assert!(messages.iter().any(|m| m.starts_with("has more % chance values than spawn strings")));
    assert!(messages.iter().any(|m| m.starts_with("has more spawn strings than offset values")));
    assert!(diagnostics.iter().all(|d| d.entry.as_deref() == Some("ABMob")));
}

#[test]
fn colliding_offsets_and_out_of_range_percentages() {
    let mut entry = mob_entry("ABMob");
    entry.offsets = vec![Offset::ORIGIN, Offset { x: 50, y: 0, z: 0 }];
    entry.percentages = vec![1.2, -0.5];
    let diagnostics = validator().validate_container(&container_with(vec![entry]));
    let found = findings(&diagnostics);
    assert!(found.contains(&&Finding::OffsetCollision { ys: vec![0] }));
    assert!(found.contains(&&Finding::PercentageOutOfBounds { values: vec![1.2, -0.5] }));
}

#[test]
fn spread_radius_floor_is_a_warning() {
    let mut low = mob_entry("LowMob");
    low.spread_radius = Some(300.0);
    let mut absent = mob_entry("AbsentMob");
    absent.spread_radius = None;
    let diagnostics = validator().validate_container(&container_with(vec![low, absent]));
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    assert_eq!(
        diagnostics[0].finding,
        Finding::SpreadRadiusBelowFloor { radius: 300.0, floor: 650.0 }
    );
    assert_eq!(diagnostics[1].finding, Finding::MissingSpreadRadius);
}

#[test]
fn single_spawn_with_mob_fields_and_inverted_range() {
    let mut container = parse_container(BEACH).container;
    container.entries[0].spread_radius = Some(650.0);
    container.entries[0].difficulty = Some(DifficultyRange { min_level: 30, max_level: 10 });
    let diagnostics = validator().validate_container(&container);
    assert_eq!(
        findings(&diagnostics),
        vec![
            &Finding::MobFieldsOnSingleSpawn,
            &Finding::InvertedDifficultyRange { min_level: 30, max_level: 10 },
        ]
    );
}

#[test]
fn revalidating_rendered_valid_containers_is_clean() {
    let container = container_with(vec![mob_entry("ABMob")]);
    let text = format!("{}\n", render_container(&container));
    let report = validator().validate_document(&text);
    assert_eq!(report.containers, vec![container]);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn report_counts_by_severity() {
    let mut low = mob_entry("LowMob");
    low.spread_radius = Some(1.0);
    let mut container = container_with(vec![low]);
    container.limits.pop();
    let text = render_container(&container);
    let report = validator().validate_document(&text);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.error_count(), 1);
    assert!(report.has_errors());
}
