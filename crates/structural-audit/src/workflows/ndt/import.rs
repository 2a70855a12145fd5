//! Import of site field logs: CSV files with `Test,Field,Value` columns.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{AuditId, NdtTest, TestToggle};
use super::form::{FormError, NdtFormState};
use super::measurement::MeasurementValue;

const STATUS_FIELD: &str = "status";

#[derive(Debug)]
pub enum FieldLogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownTest { line: usize, test: String },
    UnknownStatus { line: usize, status: String },
    Form { line: usize, source: FormError },
}

impl std::fmt::Display for FieldLogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldLogImportError::Io(err) => write!(f, "failed to read field log: {}", err),
            FieldLogImportError::Csv(err) => write!(f, "invalid field log CSV: {}", err),
            FieldLogImportError::UnknownTest { line, test } => {
                write!(f, "line {}: unknown NDT test '{}'", line, test)
            }
            FieldLogImportError::UnknownStatus { line, status } => {
                write!(f, "line {}: unknown test status '{}'", line, status)
            }
            FieldLogImportError::Form { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for FieldLogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldLogImportError::Io(err) => Some(err),
            FieldLogImportError::Csv(err) => Some(err),
            FieldLogImportError::Form { source, .. } => Some(source),
            FieldLogImportError::UnknownTest { .. } | FieldLogImportError::UnknownStatus { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for FieldLogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FieldLogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct FieldLogRow {
    #[serde(rename = "Test")]
    test: String,
    #[serde(rename = "Field")]
    field: String,
    #[serde(rename = "Value", default)]
    value: String,
}

pub struct FieldLogImporter;

impl FieldLogImporter {
    pub fn from_path<P: AsRef<Path>>(
        audit_id: AuditId,
        path: P,
    ) -> Result<NdtFormState, FieldLogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(audit_id, file)
    }

    /// Build a draft form from a field log.
    ///
    /// A `status` row sets the test's toggle explicitly. Any other row records a measurement
    /// and marks an undecided test as performed.
    pub fn from_reader<R: Read>(
        audit_id: AuditId,
        reader: R,
    ) -> Result<NdtFormState, FieldLogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut form = NdtFormState::new(audit_id);

        for (index, row) in csv_reader.deserialize::<FieldLogRow>().enumerate() {
            let row = row?;
            // header occupies line 1
            let line = index + 2;
            apply_row(&mut form, row, line)?;
        }

        Ok(form)
    }
}

fn apply_row(
    form: &mut NdtFormState,
    row: FieldLogRow,
    line: usize,
) -> Result<(), FieldLogImportError> {
    let test = row
        .test
        .parse::<NdtTest>()
        .map_err(|_| FieldLogImportError::UnknownTest {
            line,
            test: row.test.clone(),
        })?;
    let form_error = |source: FormError| FieldLogImportError::Form { line, source };

    if row.field.eq_ignore_ascii_case(STATUS_FIELD) {
        let toggle = match row.value.to_ascii_lowercase().as_str() {
            "performed" | "yes" => TestToggle::Performed,
            "skipped" | "no" => TestToggle::Skipped,
            "undecided" | "" => TestToggle::Undecided,
            _ => {
                return Err(FieldLogImportError::UnknownStatus {
                    line,
                    status: row.value,
                })
            }
        };
        form.set_toggle(test, toggle).map_err(form_error)?;
        return Ok(());
    }

    if form.toggle(test) == TestToggle::Undecided {
        form.set_toggle(test, TestToggle::Performed)
            .map_err(form_error)?;
    }
    form.record_measurement(test, &row.field, MeasurementValue::Text(row.value))
        .map_err(form_error)?;
    Ok(())
}
