use crate::infra::{
    load_photo, parse_measurement_arg, parse_photo_arg, parse_test, InMemorySubmissionRepository,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use structural_audit::config::AppConfig;
use structural_audit::error::AppError;
use structural_audit::workflows::ndt::{
    evaluate, evaluator_for, AuditId, FieldLogImporter, MeasurementValue, Measurements,
    NdtFormService, NdtFormState, NdtReport, NdtTest, PhotoAttachment, SubmissionLimits,
    SubmissionReceipt,
};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Test to evaluate (key, kebab-case or title, e.g. `half-cell-potential`)
    #[arg(value_parser = parse_test)]
    pub(crate) test: NdtTest,
    /// Raw measurements as FIELD=VALUE pairs
    #[arg(value_parser = parse_measurement_arg)]
    pub(crate) measurements: Vec<(String, MeasurementValue)>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Field log CSV with Test,Field,Value columns
    pub(crate) field_log: PathBuf,
    /// Audit the field log belongs to
    #[arg(long, default_value = "field-audit")]
    pub(crate) audit_id: String,
    /// Photos to attach as TEST=PATH pairs
    #[arg(long = "photo", value_parser = parse_photo_arg)]
    pub(crate) photos: Vec<(NdtTest, PathBuf)>,
    /// Dry-run a submission after reporting: validates photos against the configured limits
    /// and stores the form in a process-local store that is discarded on exit
    #[arg(long)]
    pub(crate) submit: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        test,
        measurements,
        json,
    } = args;

    let (inputs, ignored) = collect_measurements(test, measurements);
    if !ignored.is_empty() {
        eprintln!(
            "Ignoring unknown field(s) {} (expected one of: {})",
            ignored.join(", "),
            evaluator_for(test).fields().join(", ")
        );
    }

    let result = evaluate(test, &inputs);
    if json {
        println!("{}", render_json(&result));
        return Ok(());
    }

    println!("{}", test.title());
    println!("- Tier: {}", result.tier);
    if let Some(severity) = result.severity {
        println!("- Severity: {}", severity.label());
    }
    for (name, value) in &result.quantities {
        println!("- {} = {:.2}", name, value);
    }
    println!("- Recommendation: {}", result.recommendation);
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        field_log,
        audit_id,
        photos,
        submit,
        json,
    } = args;

    let audit_id = AuditId(audit_id);
    let form = FieldLogImporter::from_path(audit_id.clone(), &field_log)?;
    let report = NdtReport::from_form(&form);

    if json {
        println!("{}", render_json(&report));
    } else {
        render_report(&report, &field_log);
    }

    if !submit {
        return Ok(());
    }

    let attachments = photos
        .iter()
        .map(|(test, path)| load_photo(*test, path))
        .collect::<Result<Vec<_>, _>>()?;

    let limits = SubmissionLimits::from(&AppConfig::load()?.ndt);
    let receipt = submit_imported(form, attachments, limits)?;
    println!(
        "\nSubmitted {} as {} at {}",
        receipt.audit_id,
        receipt.reference,
        receipt.submitted_at.to_rfc3339()
    );
    Ok(())
}

/// Split CLI measurements into the fields the test accepts and the names it does not.
fn collect_measurements(
    test: NdtTest,
    pairs: Vec<(String, MeasurementValue)>,
) -> (Measurements, Vec<String>) {
    let evaluator = evaluator_for(test);
    let mut inputs = Measurements::new();
    let mut ignored = Vec::new();
    for (field, value) in pairs {
        if evaluator.accepts(&field) {
            inputs.insert(&field, value);
        } else {
            ignored.push(field);
        }
    }
    (inputs, ignored)
}

/// Run an imported form through the same submit path the server uses.
///
/// The store lives only for this call, so the receipt confirms the form and photos would be
/// accepted but nothing outlives the process.
fn submit_imported(
    form: NdtFormState,
    attachments: Vec<PhotoAttachment>,
    limits: SubmissionLimits,
) -> Result<SubmissionReceipt, AppError> {
    let audit_id = form.audit_id().clone();
    let service = NdtFormService::new(Arc::new(InMemorySubmissionRepository::default()), limits);
    service.load(form)?;
    Ok(service.submit(&audit_id, attachments)?)
}

fn render_report(report: &NdtReport, source: &std::path::Path) {
    println!(
        "NDT summary for audit {} ({})",
        report.audit_id,
        source.display()
    );
    if let Some(severity) = report.overall_severity {
        println!("Overall severity: {}", severity.label());
    }
    if !report.critical_findings.is_empty() {
        let names: Vec<&str> = report
            .critical_findings
            .iter()
            .map(|test| test.title())
            .collect();
        println!("Critical findings: {}", names.join(", "));
    }
    for line in report.summary_lines() {
        println!("{line}");
    }
}

fn render_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use structural_audit::workflows::ndt::{FormServiceError, SubmissionError, TestToggle};

    fn imported_form() -> NdtFormState {
        let csv = "Test,Field,Value\nrebound_hammer,reading_1,38\nrebound_hammer,reading_2,42\n";
        FieldLogImporter::from_reader(AuditId("AUD-CLI".to_string()), csv.as_bytes())
            .expect("field log")
    }

    fn photo() -> PhotoAttachment {
        PhotoAttachment {
            test: NdtTest::ReboundHammer,
            file_name: "grid.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[test]
    fn unknown_fields_are_reported_not_evaluated() {
        let pairs = vec![
            ("potential".to_string(), MeasurementValue::from("-380")),
            ("voltage".to_string(), MeasurementValue::from("12")),
        ];

        let (inputs, ignored) = collect_measurements(NdtTest::HalfCellPotential, pairs);

        assert_eq!(ignored, vec!["voltage".to_string()]);
        assert_eq!(inputs.field_names().collect::<Vec<_>>(), vec!["potential"]);
    }

    #[test]
    fn imported_submission_applies_the_given_limits() {
        let form = imported_form();
        assert_eq!(form.toggle(NdtTest::ReboundHammer), TestToggle::Performed);

        let tight = SubmissionLimits {
            max_photos: 0,
            max_photo_bytes: 1024,
        };
        match submit_imported(form.clone(), vec![photo()], tight) {
            Err(AppError::Form(FormServiceError::Submission(SubmissionError::TooManyPhotos {
                max: 0,
                found: 1,
            }))) => {}
            other => panic!("expected the photo limit to apply, got {other:?}"),
        }

        let receipt =
            submit_imported(form, vec![photo()], SubmissionLimits::default()).expect("submit");
        assert_eq!(receipt.audit_id, AuditId("AUD-CLI".to_string()));
        assert_eq!(receipt.reference, "NDT-00001");
    }
}
