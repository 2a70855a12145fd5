use serde::Serialize;

use super::domain::{AuditId, NdtTest, Severity, TestToggle};
use super::form::NdtFormState;

/// One derived quantity. Sections list them alphabetically by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityEntry {
    pub name: String,
    pub value: f64,
}

/// Narrative input for one performed test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub test: NdtTest,
    pub title: &'static str,
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub recommendation: String,
    pub quantities: Vec<QuantityEntry>,
}

/// What the report generator receives for an audit's NDT step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdtReport {
    pub audit_id: AuditId,
    pub submitted: bool,
    pub sections: Vec<ReportSection>,
    pub skipped: Vec<NdtTest>,
    pub undecided: Vec<NdtTest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_severity: Option<Severity>,
    pub critical_findings: Vec<NdtTest>,
}

impl NdtReport {
    pub fn from_form(form: &NdtFormState) -> Self {
        let mut sections = Vec::new();
        let mut skipped = Vec::new();
        let mut undecided = Vec::new();

        for test in NdtTest::ALL {
            let entry = form.entry(test);
            match entry.toggle {
                TestToggle::Skipped => skipped.push(test),
                TestToggle::Undecided => undecided.push(test),
                TestToggle::Performed => {
                    let Some(result) = &entry.result else {
                        continue;
                    };
                    sections.push(ReportSection {
                        test,
                        title: test.title(),
                        tier: result.tier.clone(),
                        severity: result.severity,
                        recommendation: result.recommendation.clone(),
                        quantities: result
                            .quantities
                            .iter()
                            .map(|(name, value)| QuantityEntry {
                                name: name.clone(),
                                value: *value,
                            })
                            .collect(),
                    });
                }
            }
        }

        let overall_severity = sections.iter().filter_map(|section| section.severity).max();
        let critical_findings = sections
            .iter()
            .filter(|section| section.severity == Some(Severity::Severe))
            .map(|section| section.test)
            .collect();

        Self {
            audit_id: form.audit_id().clone(),
            submitted: form.is_read_only(),
            sections,
            skipped,
            undecided,
            overall_severity,
            critical_findings,
        }
    }

    /// Plain-text rendering used by the CLI.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for section in &self.sections {
            let severity = section
                .severity
                .map(|severity| severity.label())
                .unwrap_or("Unknown");
            lines.push(format!(
                "- {}: {} [{}]",
                section.title, section.tier, severity
            ));
            for quantity in &section.quantities {
                lines.push(format!("    {} = {:.2}", quantity.name, quantity.value));
            }
            lines.push(format!("    {}", section.recommendation));
        }

        if !self.skipped.is_empty() {
            let names: Vec<&str> = self.skipped.iter().map(|test| test.title()).collect();
            lines.push(format!("Skipped: {}", names.join(", ")));
        }
        if !self.undecided.is_empty() {
            let names: Vec<&str> = self.undecided.iter().map(|test| test.title()).collect();
            lines.push(format!("Not yet decided: {}", names.join(", ")));
        }
        lines
    }
}
