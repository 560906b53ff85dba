use mfm_model::{
    DetachmentData, EntityKind, FactionData, RevisionData, Rule, UnitData, Violation,
    DEFAULT_MAX_NAME_LEN,
};
use pretty_assertions::assert_eq;

fn validate(factions: Vec<FactionData>) -> Vec<Violation> {
    RevisionData::new(factions).validate(DEFAULT_MAX_NAME_LEN)
}

fn boyz() -> UnitData {
    UnitData::new("Boyz").with_variant(10, 80)
}

// ── Clean input ──────────────────────────────────────────────────

#[test]
fn valid_revision_has_no_violations() {
    let violations = validate(vec![
        FactionData::new("Orks")
            .with_detachment(DetachmentData::new("War Horde").with_enhancement("Follow Me Ladz", 0))
            .with_unit(boyz()),
        FactionData::new("Aeldari").with_unit(UnitData::new("Guardians").with_variant(10, 100)),
    ]);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn empty_revision_is_valid() {
    assert!(validate(vec![]).is_empty());
}

// ── Name uniqueness ──────────────────────────────────────────────

#[test]
fn duplicate_faction_names_are_rejected() {
    let violations = validate(vec![
        FactionData::new("Aeldari").with_unit(boyz()),
        FactionData::new("Aeldari").with_unit(boyz()),
    ]);
    assert_eq!(
        violations,
        vec![Violation::new(
            EntityKind::Faction,
            "Aeldari",
            Rule::DuplicateName {
                name: "Aeldari".into()
            },
        )]
    );
}

#[test]
fn triple_duplicate_reported_once() {
    let violations = validate(vec![
        FactionData::new("Orks"),
        FactionData::new("Orks"),
        FactionData::new("Orks"),
    ]);
    assert_eq!(violations.len(), 1);
}

#[test]
fn same_name_under_different_parents_is_fine() {
    let violations = validate(vec![
        FactionData::new("Orks").with_unit(UnitData::new("Warboss").with_variant(1, 65)),
        FactionData::new("Orks Beast Snagga").with_unit(UnitData::new("Warboss").with_variant(1, 65)),
    ]);
    assert!(violations.is_empty());
}

#[test]
fn duplicate_units_and_detachments_are_scoped_to_faction() {
    let violations = validate(vec![FactionData::new("Orks")
        .with_unit(boyz())
        .with_unit(boyz())
        .with_detachment(DetachmentData::new("War Horde"))
        .with_detachment(DetachmentData::new("War Horde"))]);
    let kinds: Vec<EntityKind> = violations.iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![EntityKind::Detachment, EntityKind::Unit]);
    assert_eq!(violations[1].path, "Orks/Boyz");
}

#[test]
fn duplicate_enhancement_within_detachment() {
    let violations = validate(vec![FactionData::new("Orks").with_detachment(
        DetachmentData::new("War Horde")
            .with_enhancement("Follow Me Ladz", 25)
            .with_enhancement("Follow Me Ladz", 30),
    )]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, EntityKind::Enhancement);
    assert_eq!(violations[0].path, "Orks/War Horde/Follow Me Ladz");
}

#[test]
fn names_are_case_sensitive() {
    let violations = validate(vec![FactionData::new("Orks"), FactionData::new("orks")]);
    assert!(violations.is_empty());
}

// ── Points and variants ──────────────────────────────────────────

#[test]
fn negative_points_are_rejected() {
    let violations = validate(vec![FactionData::new("Orks")
        .with_unit(UnitData::new("Boyz").with_variant(10, -1))
        .with_detachment(DetachmentData::new("War Horde").with_enhancement("Kit", -20))]);
    let rules: Vec<&Rule> = violations.iter().map(|v| &v.rule).collect();
    assert_eq!(
        rules,
        vec![
            &Rule::NegativePoints { points: -20 },
            &Rule::NegativePoints { points: -1 },
        ]
    );
    assert_eq!(violations[1].path, "Orks/Boyz/10");
}

#[test]
fn points_beyond_u32_overflow() {
    let violations = validate(vec![
        FactionData::new("Orks").with_unit(UnitData::new("Boyz").with_variant(10, i64::from(u32::MAX) + 1)),
    ]);
    assert!(matches!(violations[0].rule, Rule::PointsOverflow { .. }));
}

#[test]
fn unit_without_variants_is_rejected() {
    let violations = validate(vec![FactionData::new("Orks").with_unit(UnitData::new("Gretchin"))]);
    assert_eq!(
        violations,
        vec![Violation::new(EntityKind::Unit, "Orks/Gretchin", Rule::UnitWithoutVariants)]
    );
}

#[test]
fn zero_and_negative_model_counts_are_rejected() {
    let violations = validate(vec![FactionData::new("Orks").with_unit(
        UnitData::new("Boyz").with_variant(0, 10).with_variant(-5, 10),
    )]);
    assert_eq!(violations.len(), 2);
    assert!(violations
        .iter()
        .all(|v| matches!(v.rule, Rule::InvalidModelCount { .. })));
}

#[test]
fn duplicate_model_count_is_rejected() {
    let violations = validate(vec![FactionData::new("Orks").with_unit(
        UnitData::new("Boyz").with_variant(10, 80).with_variant(10, 85),
    )]);
    assert_eq!(
        violations,
        vec![Violation::new(
            EntityKind::Variant,
            "Orks/Boyz/10",
            Rule::DuplicateModelCount { model_count: 10 },
        )]
    );
}

// ── Names ────────────────────────────────────────────────────────

#[test]
fn blank_names_are_rejected() {
    let violations = validate(vec![FactionData::new("  ").with_unit(boyz())]);
    assert_eq!(violations[0].rule, Rule::EmptyName);
}

#[test]
fn long_names_respect_limit() {
    let revision = RevisionData::new(vec![FactionData::new("x".repeat(20)).with_unit(boyz())]);
    assert!(revision.validate(20).is_empty());
    assert_eq!(revision.validate(19)[0].rule, Rule::NameTooLong { max: 19 });
}

#[test]
fn every_violation_is_collected() {
    let violations = validate(vec![
        FactionData::new("Orks")
            .with_unit(UnitData::new("Gretchin"))
            .with_unit(UnitData::new("Boyz").with_variant(10, -1)),
        FactionData::new(""),
    ]);
    assert_eq!(violations.len(), 3);
}

#[test]
fn violation_display_names_kind_path_and_rule() {
    let violation = Violation::new(EntityKind::Unit, "Orks/Gretchin", Rule::UnitWithoutVariants);
    assert_eq!(violation.to_string(), "unit \"Orks/Gretchin\": unit has no size variants");
}

// ── Paths ────────────────────────────────────────────────────────

#[test]
fn slash_in_names_is_escaped_in_paths() {
    let faction_slash = validate(vec![FactionData::new("A/B").with_unit(UnitData::new("C"))]);
    let unit_slash = validate(vec![FactionData::new("A").with_unit(UnitData::new("B/C"))]);

    assert_eq!(faction_slash[0].path, "A%2FB/C");
    assert_eq!(unit_slash[0].path, "A/B%2FC");
    assert_ne!(faction_slash[0].path, unit_slash[0].path);
}

#[test]
fn percent_in_names_is_escaped_first() {
    assert_eq!(Violation::path_of(["50%", "x%2Fy"]), "50%25/x%252Fy");
    assert_eq!(Violation::path_of(["Orks", "Boyz", "10"]), "Orks/Boyz/10");
}
