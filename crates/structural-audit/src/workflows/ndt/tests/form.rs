use super::common::*;
use crate::workflows::ndt::{
    FormError, Measurements, NdtFormState, NdtReport, NdtTest, Severity, SubmissionStatus,
    TestToggle,
};

#[test]
fn new_form_starts_with_every_test_undecided() {
    let form = NdtFormState::new(audit_id());

    assert_eq!(form.entries().count(), NdtTest::ALL.len());
    for test in NdtTest::ALL {
        assert_eq!(form.toggle(test), TestToggle::Undecided);
        assert!(form.result(test).is_none());
        assert!(form.entry(test).measurements.is_empty());
    }
    assert!(!form.is_read_only());
}

#[test]
fn performing_a_test_evaluates_it_immediately() {
    let mut form = NdtFormState::new(audit_id());

    let result = form
        .set_toggle(NdtTest::UltrasonicPulseVelocity, TestToggle::Performed)
        .expect("toggle")
        .cloned()
        .expect("performed test carries a result");

    assert_eq!(result.tier, "Very Poor");
    assert_eq!(result.quantity("velocity"), Some(0.0));
}

#[test]
fn recording_a_measurement_recomputes_only_that_test() {
    let mut form = populated_form();
    let half_cell_before = form.result(NdtTest::HalfCellPotential).cloned();

    let result = form
        .record_measurement(NdtTest::ReboundHammer, "reading_3", 52.0.into())
        .expect("record")
        .clone();

    assert_eq!(result.quantity("rebound_index"), Some(44.0));
    assert_eq!(result.tier, "Very Good");
    assert_eq!(form.result(NdtTest::HalfCellPotential).cloned(), half_cell_before);
}

#[test]
fn skipping_clears_measurements_and_reperforming_starts_empty() {
    let mut form = populated_form();
    assert!(!form.entry(NdtTest::ReboundHammer).measurements.is_empty());

    let cleared = form
        .set_toggle(NdtTest::ReboundHammer, TestToggle::Skipped)
        .expect("skip");
    assert!(cleared.is_none());
    assert!(form.entry(NdtTest::ReboundHammer).measurements.is_empty());
    assert!(form.result(NdtTest::ReboundHammer).is_none());

    form.set_toggle(NdtTest::ReboundHammer, TestToggle::Performed)
        .expect("perform again");
    assert!(form.entry(NdtTest::ReboundHammer).measurements.is_empty());
    let result = form.result(NdtTest::ReboundHammer).expect("fresh result");
    assert_eq!(result.quantity("rebound_index"), Some(0.0));
    assert_eq!(result.tier, "Poor");
}

#[test]
fn returning_to_undecided_keeps_measurements_but_drops_the_result() {
    let mut form = populated_form();

    form.set_toggle(NdtTest::HalfCellPotential, TestToggle::Undecided)
        .expect("undecide");

    assert!(form.result(NdtTest::HalfCellPotential).is_none());
    assert!(form
        .entry(NdtTest::HalfCellPotential)
        .measurements
        .get("potential")
        .is_some());

    form.set_toggle(NdtTest::HalfCellPotential, TestToggle::Performed)
        .expect("perform");
    let result = form.result(NdtTest::HalfCellPotential).expect("result");
    assert_eq!(result.tier, "High Risk");
}

#[test]
fn measurements_require_a_performed_test() {
    let mut form = populated_form();

    let skipped = form
        .record_measurement(NdtTest::Chloride, "content", 0.4.into())
        .expect_err("skipped test rejects input");
    assert_eq!(
        skipped,
        FormError::NotPerformed {
            test: NdtTest::Chloride,
            toggle: TestToggle::Skipped,
        }
    );

    let undecided = form
        .replace_measurements(NdtTest::Sulfate, Measurements::new().with("content", 0.2))
        .expect_err("undecided test rejects input");
    assert!(matches!(
        undecided,
        FormError::NotPerformed {
            toggle: TestToggle::Undecided,
            ..
        }
    ));
}

#[test]
fn unknown_fields_are_rejected_without_touching_the_entry() {
    let mut form = populated_form();
    let before = form.entry(NdtTest::ReboundHammer).clone();

    let error = form
        .replace_measurements(
            NdtTest::ReboundHammer,
            Measurements::new().with("reading_1", 30.0).with("reading_4", 31.0),
        )
        .expect_err("reading_4 is not a rebound field");

    assert_eq!(
        error,
        FormError::UnknownField {
            test: NdtTest::ReboundHammer,
            field: "reading_4".to_string(),
        }
    );
    assert_eq!(form.entry(NdtTest::ReboundHammer), &before);
}

#[test]
fn submitted_form_rejects_every_mutation() {
    let mut form = as_submitted(&populated_form());

    assert!(form.is_read_only());
    let expected = FormError::ReadOnly {
        audit_id: audit_id(),
    };
    assert_eq!(
        form.set_toggle(NdtTest::Sulfate, TestToggle::Performed)
            .map(|_| ())
            .expect_err("read-only"),
        expected
    );
    assert_eq!(
        form.record_measurement(NdtTest::ReboundHammer, "reading_1", 10.0.into())
            .map(|_| ())
            .expect_err("read-only"),
        expected
    );
}

#[test]
fn report_summarises_performed_tests_and_flags_severe_findings() {
    let form = populated_form();
    let report = NdtReport::from_form(&form);

    let tests: Vec<NdtTest> = report.sections.iter().map(|section| section.test).collect();
    assert_eq!(tests, vec![NdtTest::ReboundHammer, NdtTest::HalfCellPotential]);
    assert_eq!(report.skipped, vec![NdtTest::Chloride]);
    assert_eq!(report.undecided.len(), NdtTest::ALL.len() - 3);
    assert_eq!(report.overall_severity, Some(Severity::Severe));
    assert_eq!(report.critical_findings, vec![NdtTest::HalfCellPotential]);
    assert!(!report.submitted);

    let lines = report.summary_lines();
    assert!(lines.iter().any(|line| line == "- Half-Cell Potential: High Risk [Severe]"));
    assert!(lines.iter().any(|line| line == "Skipped: Chloride Content"));
}

#[test]
fn recompute_refreshes_results_of_restored_performed_tests() {
    let mut entries = std::collections::BTreeMap::new();
    entries.insert(
        NdtTest::CrushingStrength,
        crate::workflows::ndt::TestEntry {
            toggle: TestToggle::Performed,
            measurements: Measurements::new().with("strength", 76.0),
            result: Some(Default::default()),
        },
    );
    let mut form = NdtFormState::restore(audit_id(), entries, SubmissionStatus::Draft);

    form.recompute();

    let result = form.result(NdtTest::CrushingStrength).expect("result");
    assert_eq!(result.tier, "Slightly Lower");
    assert_eq!(result.severity, Some(Severity::Minor));
    assert!(form.result(NdtTest::Sulfate).is_none());
}

#[test]
fn report_lists_quantities_alphabetically() {
    let mut form = NdtFormState::new(audit_id());
    form.set_toggle(NdtTest::CoreSampling, TestToggle::Performed)
        .expect("toggle core");
    form.replace_measurements(
        NdtTest::CoreSampling,
        Measurements::new()
            .with("length", 200.0)
            .with("diameter", 100.0)
            .with("measured_strength", 30.0)
            .with("weight", 3.7),
    )
    .expect("core inputs");

    let report = NdtReport::from_form(&form);

    let names: Vec<&str> = report.sections[0]
        .quantities
        .iter()
        .map(|quantity| quantity.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["corrected_strength", "correction_factor", "density", "ld_ratio"]
    );
}
