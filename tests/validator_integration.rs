//! Integration tests for the annotation validator

use cryptic_tutor::validate::{validate, FindingCategory, Severity};
use cryptic_tutor::{AbbreviationTable, ClueDefinition, ClueLoadError, ValidationReport};

const VISIT: &str = include_str!("fixtures/visit.toml");
const EEK: &str = include_str!("fixtures/eek.toml");
const DRIPS: &str = include_str!("fixtures/drips.toml");
const LEAKS: &str = include_str!("fixtures/leaks.toml");
const MISMATCH: &str = include_str!("fixtures/mismatch.toml");
const COT: &str = include_str!("fixtures/cot.toml");
const ANT: &str = include_str!("fixtures/ant.toml");
const ISLET: &str = include_str!("fixtures/islet.toml");
const NIGHT: &str = include_str!("fixtures/night.toml");
const FINE: &str = include_str!("fixtures/fine.toml");

fn check(source: &str) -> ValidationReport {
    let clue = ClueDefinition::from_toml(source).expect("Fixture should parse");
    validate(&clue, &AbbreviationTable::default())
}

/// Replace exactly one occurrence, so a typo in a test fails loudly
fn corrupt(source: &str, from: &str, to: &str) -> String {
    assert_eq!(source.matches(from).count(), 1, "Expected one '{}' in fixture", from);
    source.replace(from, to)
}

fn assert_semantic_error(report: &ValidationReport, fragment: &str) {
    let semantic: Vec<String> = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Error && f.category == FindingCategory::Semantic)
        .map(|f| f.message.clone())
        .collect();
    assert!(
        semantic.iter().any(|m| m.contains(fragment)),
        "Expected semantic error mentioning '{}', got: {:?}",
        fragment,
        report.errors()
    );
}

#[test]
fn test_shipped_fixtures_are_clean() {
    for (name, source) in [
        ("visit", VISIT),
        ("eek", EEK),
        ("drips", DRIPS),
        ("leaks", LEAKS),
        ("cot", COT),
        ("ant", ANT),
        ("islet", ISLET),
        ("night", NIGHT),
        ("fine", FINE),
    ] {
        let report = check(source);
        assert!(
            report.is_clean(),
            "{} should validate without findings, got: {:?}",
            name,
            report.findings
        );
    }
}

#[test]
fn test_enumeration_mismatch_is_explicit_error() {
    let report = check(MISMATCH);
    assert!(report.has_errors());
    let length: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Length)
        .collect();
    assert!(
        length.iter().any(|f| f.message.contains("terminal fragments supply 7 letters")
            && f.message.contains("'5,3' requires 8")),
        "Expected length mismatch, got: {:?}",
        report.errors()
    );
}

#[test]
fn test_corrupted_anagram_rejected() {
    let source = corrupt(
        ISLET,
        "result = \"ISLET\"\nhint = \"Rearrange",
        "result = \"ISLES\"\nhint = \"Rearrange",
    );
    assert_semantic_error(&check(&source), "transform 1 (anagram)");
}

#[test]
fn test_corrupted_container_offset_rejected() {
    let source = corrupt(
        LEAKS,
        "result = \"DRIPS\"\nhint = \"Put R",
        "result = \"RDIPS\"\nhint = \"Put R",
    );
    assert_semantic_error(&check(&source), "transform 2 (container)");
}

#[test]
fn test_corrupted_substitution_rejected() {
    let source = corrupt(COT, "result = \"COT\"\nhint", "result = \"DOT\"\nhint");
    assert_semantic_error(&check(&source), "transform 1 (substitution)");
}

#[test]
fn test_corrupted_reversal_rejected() {
    let source = corrupt(EEK, "result = \"EEK\"\nhint", "result = \"KEE\"\nhint");
    assert_semantic_error(&check(&source), "transform 2 (reversal)");
}

#[test]
fn test_corrupted_deletion_rejected() {
    let source = corrupt(EEK, "result = \"KEE\"\nhint", "result = \"NEK\"\nhint");
    assert_semantic_error(&check(&source), "transform 1 (deletion)");
}

#[test]
fn test_corrupted_literal_rejected() {
    let source = corrupt(ISLET, "result = \"TILES\"", "result = \"TILER\"");
    assert_semantic_error(&check(&source), "transform 0 (literal)");
}

#[test]
fn test_corrupted_letter_selection_rejected() {
    let source = corrupt(ANT, "result = \"ANT\"\nhint", "result = \"TNA\"\nhint");
    assert_semantic_error(&check(&source), "transform 0 (letter_selection)");
}

#[test]
fn test_unknown_abbreviation_only_warns() {
    let source = corrupt(VISIT, "result = \"V\"", "result = \"F\"");
    let source = source.replace("result = \"VISIT\"", "result = \"FISIT\"");
    let source = source.replace("answer = \"VISIT\"", "answer = \"FISIT\"");
    let report = check(&source);
    assert!(!report.has_errors(), "{:?}", report.errors());
    assert!(report
        .warnings()
        .iter()
        .any(|w| w.contains("not in the abbreviation table")));
}

#[test]
fn test_missing_indicator_kind_is_error() {
    let source = corrupt(EEK, "indicator_kind = \"deletion\"\n", "");
    let report = check(&source);
    assert!(report
        .errors()
        .iter()
        .any(|e| e.contains("missing indicator_kind")));
}

#[test]
fn test_unknown_indicator_kind_fails_to_load() {
    let source = corrupt(EEK, "indicator_kind = \"deletion\"", "indicator_kind = \"spoonerism\"");
    assert!(matches!(
        ClueDefinition::from_toml(&source),
        Err(ClueLoadError::Toml(_))
    ));
}

#[test]
fn test_dependent_without_indicator_is_error() {
    let source = corrupt(COT, "indicator_kind = \"substitution\"", "indicator_kind = \"anagram\"");
    let report = check(&source);
    let indicator: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.category == FindingCategory::Indicator)
        .collect();
    assert_eq!(indicator.len(), 1, "{:?}", report.findings);
    assert!(indicator[0].message.contains("substitution"));
}

#[test]
fn test_hidden_indicator_satisfies_reversal() {
    let source = corrupt(EEK, "indicator_kind = \"reversal\"", "indicator_kind = \"hidden\"");
    let report = check(&source);
    assert!(!report.has_errors(), "{:?}", report.errors());
}

#[test]
fn test_out_of_range_index_is_error() {
    let source = corrupt(DRIPS, "kind = \"outer_fragment\"\nindices = [4]", "kind = \"outer_fragment\"\nindices = [9]");
    let report = check(&source);
    assert!(report.errors().iter().any(|e| e.contains("references word 9")));
}

#[test]
fn test_wordplay_choice_expected_must_be_an_option() {
    let source = corrupt(VISIT, "expected = \"Charade\"", "expected = \"Homophone\"");
    let report = check(&source);
    assert!(report.errors().iter().any(|e| e.contains("not one of its options")));
}

#[test]
fn test_unused_indicator_warns() {
    let source = corrupt(
        VISIT,
        "[[steps]]\nkind = \"abbreviation_scan\"",
        "[[steps]]\nkind = \"indicator\"\nindices = [1]\nindicator_kind = \"anagram\"\n\n[[steps]]\nkind = \"abbreviation_scan\"",
    );
    let report = check(&source);
    assert!(!report.has_errors(), "{:?}", report.errors());
    assert!(report
        .warnings()
        .iter()
        .any(|w| w.contains("anagram indicator is not used")));
}

#[test]
fn test_report_serializes() {
    let report = check(MISMATCH);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["clue"], "mismatch");
    assert!(json["findings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["severity"] == "error" && f["category"] == "length"));
}
