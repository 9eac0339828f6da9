use super::*;
use crate::diagnostics::Finding;

const BEACH: &str = r#"ConfigOverrideNPCSpawnEntriesContainer=(NPCSpawnEntriesContainerClassString="DinoSpawnEntriesBeach_C",NPCSpawnEntries=((AnEntryName="Test_C",ColorSets="X",EntryWeight=1,NPCsToSpawnStrings=("A_C"))),NPCSpawnLimits=((NPCClassString="A_C",MaxPercentageOfDesiredNumToAllow=0.3)))"#;

const MOB: &str = r#"ConfigAddNPCSpawnEntriesContainer=(NPCSpawnEntriesContainerClassString="DinoSpawnEntriesSwamp_C",NPCSpawnEntries=((AnEntryName="YutyRaptorMobDinoSpawnEntriesSwamp",ColorSets="DinoColorSet_AllColors_C",NPCsToSpawnPercentageChance=(1,0.5),ManualSpawnPointSpreadRadius=650,NPCsSpawnOffsets=((X=0,Y=0,Z=0),(X=0,Y=400,Z=0)),EntryWeight=0.25,NPCsToSpawnStrings=("Yutyrannus_Character_BP_C","Raptor_Character_BP_C"),NPCDifficultyLevelRanges=((EnemyLevelsMin=(15),EnemyLevelsMax=(38),GameDifficulties=(0))))),NPCSpawnLimits=((NPCClassString="Yutyrannus_Character_BP_C",MaxPercentageOfDesiredNumToAllow=0.03),(NPCClassString="Raptor_Character_BP_C",MaxPercentageOfDesiredNumToAllow=0.03)))"#;

#[test]
fn parses_single_spawn_container() {
    let parsed = parse_container(BEACH);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

    let container = parsed.container;
    assert_eq!(container.directive, ContainerDirective::Override);
    assert_eq!(container.name, "DinoSpawnEntriesBeach_C");
    assert_eq!(container.entries.len(), 1);
    assert_eq!(container.limits.len(), 1);

    let entry = &container.entries[0];
    assert_eq!(entry.name, "Test_C");
    assert_eq!(entry.color_set, "X");
    assert_eq!(entry.weight, 1.0);
    assert_eq!(entry.creature_ids, vec!["A_C".to_string()]);
    assert!(entry.percentages.is_empty());
    assert!(entry.offsets.is_empty());
    assert_eq!(entry.spread_radius, None);
    assert_eq!(entry.difficulty, None);

    assert_eq!(container.limits[0].creature_id, "A_C");
    assert_eq!(container.limits[0].max_percentage, 0.3);
}

#[test]
fn parses_mob_entry_fields() {
    let parsed = parse_container(MOB);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

    let container = parsed.container;
    assert_eq!(container.directive, ContainerDirective::Add);
    let entry = &container.entries[0];
    assert_eq!(entry.creature_ids.len(), 2);
    assert_eq!(entry.percentages, vec![1.0, 0.5]);
    assert_eq!(entry.offsets, vec![Offset::ORIGIN, Offset::vertical(400)]);
    assert_eq!(entry.spread_radius, Some(650.0));
    assert_eq!(entry.weight, 0.25);
    assert_eq!(entry.difficulty, Some(DifficultyRange { min_level: 15, max_level: 38 }));
    assert_eq!(container.limits.len(), 2);
}

#[test]
fn field_order_inside_entry_is_not_significant() {
    let shuffled = r#"ConfigOverrideNPCSpawnEntriesContainer=(NPCSpawnLimits=((MaxPercentageOfDesiredNumToAllow=0.3,NPCClassString="A_C")),NPCSpawnEntries=((NPCsToSpawnStrings=("A_C"),EntryWeight=1,ColorSets="X",AnEntryName="Test_C")),NPCSpawnEntriesContainerClassString="DinoSpawnEntriesBeach_C")"#;
    let left = parse_container(shuffled);
    let right = parse_container(BEACH);
    assert!(left.diagnostics.is_empty(), "{:?}", left.diagnostics);
    assert_eq!(left.container, right.container);
}

#[test]
fn render_reproduces_canonical_text() {
    assert_eq!(render_container(&parse_container(BEACH).container), BEACH);
    assert_eq!(render_container(&parse_container(MOB).container), MOB);
}

#[test]
fn empty_field_value_is_reported_without_failing_the_record() {
    let record = BEACH.replace(r#"ColorSets="X""#, r#"ColorSets="""#);
    let parsed = parse_container(&record);
    assert_eq!(parsed.container.entries.len(), 1);
    assert_eq!(parsed.container.limits.len(), 1);
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].entry.as_deref(), Some("Test_C"));
    assert_eq!(parsed.diagnostics[0].finding, Finding::EmptyField { field: fields::COLOR_SETS });
}

#[test]
fn absent_optional_field_yields_default_silently() {
    let record = BEACH.replace(r#"ColorSets="X","#, "");
    let parsed = parse_container(&record);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.container.entries[0].color_set, "");
}

#[test]
fn missing_weight_and_bad_limit_value_are_scoped() {
    let record = BEACH
        .replace("EntryWeight=1,", "")
        .replace("MaxPercentageOfDesiredNumToAllow=0.3", "MaxPercentageOfDesiredNumToAllow=abc");
    let parsed = parse_container(&record);

    assert!(parsed.diagnostics.iter().any(|d| d.entry.as_deref() == Some("Test_C")
        && d.finding == Finding::MissingField { field: fields::WEIGHT }));
    assert!(parsed.diagnostics.iter().any(|d| d.entry.is_none()
        && d.finding
            == Finding::InvalidValue { field: fields::LIMIT_MAX, value: "abc".to_string() }));
    assert_eq!(parsed.container.limits.len(), 1);
}

#[test]
fn fractional_and_oversized_offsets_are_reported_not_truncated() {
    let text = MOB.replace(
        "NPCsSpawnOffsets=((X=0,Y=0,Z=0),(X=0,Y=400,Z=0))",
        "NPCsSpawnOffsets=((X=0,Y=0.4,Z=0),(X=0,Y=9999999999,Z=0))",
    );
    let parsed = parse_container(&text);

    assert!(parsed.container.entries[0].offsets.is_empty());
    let findings: Vec<&Finding> = parsed.diagnostics.iter().map(|d| &d.finding).collect();
    assert_eq!(
        findings,
        vec![
            &Finding::InvalidValue { field: fields::OFFSETS, value: "(X=0,Y=0.4,Z=0)".to_string() },
            &Finding::InvalidValue {
                field: fields::OFFSETS,
                value: "(X=0,Y=9999999999,Z=0)".to_string()
            },
        ]
    );
    let entry = Some("YutyRaptorMobDinoSpawnEntriesSwamp");
    assert!(parsed.diagnostics.iter().all(|d| d.entry.as_deref() == entry));
}

#[test]
fn unknown_directive_is_reported_but_parsed() {
    let record = BEACH.replace("ConfigOverride", "ConfigReplace");
    let parsed = parse_container(&record);
    assert_eq!(parsed.container.name, "DinoSpawnEntriesBeach_C");
    assert!(
        parsed
            .diagnostics
            .iter()
            .any(|d| d.finding == Finding::UnrecognizedRecord { context: "container" })
    );
}

#[test]
fn entry_without_name_field_is_not_an_entry() {
    let record = BEACH.replace("AnEntryName", "SomeOtherName");
    let parsed = parse_container(&record);
    assert!(parsed.container.entries.is_empty());
    assert!(
        parsed
            .diagnostics
            .iter()
            .any(|d| d.finding == Finding::UnrecognizedRecord { context: "spawn entry" })
    );
}

#[test]
fn document_scan_picks_only_container_lines() {
    let header = "[/script/shootergame.shootergamemode]";
    let text = format!("{header}\n{BEACH}\nSomeOtherSetting=1\n{MOB}\n");
    let document = RecordScanner::new().expect("scanner").parse_document(&text);
    assert_eq!(document.records.len(), 2);
    assert_eq!(document.records[0].line, 2);
    assert_eq!(document.records[1].line, 4);
    assert_eq!(document.containers()[1].name, "DinoSpawnEntriesSwamp_C");
    assert!(document.diagnostics().is_empty());
}

#[test]
fn render_document_terminates_each_record() {
    let containers = vec![parse_container(BEACH).container, parse_container(MOB).container];
    let text = render_document(&containers);
    assert_eq!(text.lines().count(), 2);
    assert!(text.ends_with('\n'));
    let scanner = RecordScanner::new().expect("scanner");
    assert_eq!(scanner.parse_document(&text).containers(), containers);
}
