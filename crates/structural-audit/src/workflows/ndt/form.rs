use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AuditId, DerivedResult, NdtTest, TestToggle};
use super::evaluators::evaluator_for;
use super::measurement::{MeasurementValue, Measurements};
use super::submission::SubmissionStatus;

/// Errors raised when the wizard tries to mutate the form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("NDT form for audit {audit_id} has been submitted and is read-only")]
    ReadOnly { audit_id: AuditId },
    #[error("{test} is {toggle} so its measurements cannot be recorded")]
    NotPerformed { test: NdtTest, toggle: TestToggle },
    #[error("{test} has no field named '{field}'")]
    UnknownField { test: NdtTest, field: String },
}

/// Toggle, raw measurements and current result for one test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub toggle: TestToggle,
    pub measurements: Measurements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DerivedResult>,
}

/// Everything the NDT wizard step holds for one audit. Every test always has an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdtFormState {
    audit_id: AuditId,
    tests: BTreeMap<NdtTest, TestEntry>,
    status: SubmissionStatus,
}

impl NdtFormState {
    /// Fresh draft with every test undecided.
    pub fn new(audit_id: AuditId) -> Self {
        let tests = NdtTest::ALL
            .into_iter()
            .map(|test| (test, TestEntry::default()))
            .collect();

        Self {
            audit_id,
            tests,
            status: SubmissionStatus::Draft,
        }
    }

    /// Rebuild a form from stored entries, e.g. a submission re-rendered read-only.
    pub fn restore(
        audit_id: AuditId,
        entries: BTreeMap<NdtTest, TestEntry>,
        status: SubmissionStatus,
    ) -> Self {
        let mut form = Self::new(audit_id);
        for (test, entry) in entries {
            form.tests.insert(test, entry);
        }
        form.status = status;
        form
    }

    pub fn audit_id(&self) -> &AuditId {
        &self.audit_id
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_read_only(&self) -> bool {
        self.status.is_submitted()
    }

    pub fn entry(&self, test: NdtTest) -> &TestEntry {
        &self.tests[&test]
    }

    pub fn entries(&self) -> impl Iterator<Item = (NdtTest, &TestEntry)> {
        self.tests.iter().map(|(test, entry)| (*test, entry))
    }

    pub fn toggle(&self, test: NdtTest) -> TestToggle {
        self.entry(test).toggle
    }

    pub fn result(&self, test: NdtTest) -> Option<&DerivedResult> {
        self.entry(test).result.as_ref()
    }

    /// Change whether a test is performed.
    ///
    /// Skipping wipes the test's measurements and result. Marking it performed evaluates
    /// immediately so a performed test always carries a result, even before any input.
    pub fn set_toggle(
        &mut self,
        test: NdtTest,
        toggle: TestToggle,
    ) -> Result<Option<&DerivedResult>, FormError> {
        self.ensure_editable()?;
        let entry = self.entry_mut(test);
        entry.toggle = toggle;

        match toggle {
            TestToggle::Skipped => {
                entry.measurements.clear();
                entry.result = None;
            }
            TestToggle::Performed => {
                entry.result = Some(evaluator_for(test).evaluate(&entry.measurements));
            }
            TestToggle::Undecided => {
                entry.result = None;
            }
        }

        Ok(entry.result.as_ref())
    }

    /// Record one field edit and recompute that test's result.
    pub fn record_measurement(
        &mut self,
        test: NdtTest,
        field: &str,
        value: MeasurementValue,
    ) -> Result<&DerivedResult, FormError> {
        self.ensure_measurable(test)?;
        ensure_known_field(test, field)?;

        let entry = self.entry_mut(test);
        entry.measurements.insert(field, value);
        Ok(entry.refresh(test))
    }

    /// Replace all of a test's measurements at once.
    pub fn replace_measurements(
        &mut self,
        test: NdtTest,
        measurements: Measurements,
    ) -> Result<&DerivedResult, FormError> {
        self.ensure_measurable(test)?;
        for field in measurements.field_names() {
            ensure_known_field(test, field)?;
        }

        let entry = self.entry_mut(test);
        entry.measurements = measurements;
        Ok(entry.refresh(test))
    }

    /// Re-run every performed test's evaluator.
    pub fn recompute(&mut self) {
        for (test, entry) in self.tests.iter_mut() {
            if entry.toggle == TestToggle::Performed {
                entry.refresh(*test);
            }
        }
    }

    fn entry_mut(&mut self, test: NdtTest) -> &mut TestEntry {
        self.tests.entry(test).or_default()
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        if self.is_read_only() {
            return Err(FormError::ReadOnly {
                audit_id: self.audit_id.clone(),
            });
        }
        Ok(())
    }

    fn ensure_measurable(&self, test: NdtTest) -> Result<(), FormError> {
        self.ensure_editable()?;
        let toggle = self.toggle(test);
        if toggle != TestToggle::Performed {
            return Err(FormError::NotPerformed { test, toggle });
        }
        Ok(())
    }
}

impl TestEntry {
    fn refresh(&mut self, test: NdtTest) -> &DerivedResult {
        self.result
            .insert(evaluator_for(test).evaluate(&self.measurements))
    }
}

fn ensure_known_field(test: NdtTest, field: &str) -> Result<(), FormError> {
    if evaluator_for(test).accepts(field) {
        Ok(())
    } else {
        Err(FormError::UnknownField {
            test,
            field: field.to_string(),
        })
    }
}
