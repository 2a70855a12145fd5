use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Sulfate content as a percentage.
pub const FIELDS: &[&str] = &["content"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SulfateRisk {
    High,
    Low,
}

impl Tier for SulfateRisk {
    fn label(self) -> &'static str {
        match self {
            SulfateRisk::High => "High Risk",
            SulfateRisk::Low => "Low Risk",
        }
    }

    fn severity(self) -> Severity {
        match self {
            SulfateRisk::High => Severity::Severe,
            SulfateRisk::Low => Severity::Satisfactory,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            SulfateRisk::High => {
                "High sulfate content indicates a risk of sulfate attack. Investigate expansion and cracking and protect exposed surfaces."
            }
            SulfateRisk::Low => "Sulfate content is low. No action required.",
        }
    }
}

const RISK: ThresholdTable<SulfateRisk> =
    ThresholdTable::new(&[(Bound::AtLeast(0.10), SulfateRisk::High)], SulfateRisk::Low);

pub fn classify(content: f64) -> SulfateRisk {
    RISK.classify(content)
}

pub struct Sulfate;

impl Evaluator for Sulfate {
    fn test(&self) -> NdtTest {
        NdtTest::Sulfate
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let content = measurements.number("content");
        derived(classify(content), [("content", content)])
    }
}
