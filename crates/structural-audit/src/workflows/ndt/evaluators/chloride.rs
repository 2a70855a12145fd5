use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Chloride content as a percentage by weight of cement.
pub const FIELDS: &[&str] = &["content"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChlorideRisk {
    High,
    Moderate,
    Low,
}

impl Tier for ChlorideRisk {
    fn label(self) -> &'static str {
        match self {
            ChlorideRisk::High => "High Risk",
            ChlorideRisk::Moderate => "Moderate Risk",
            ChlorideRisk::Low => "Low Risk",
        }
    }

    fn severity(self) -> Severity {
        match self {
            ChlorideRisk::High => Severity::Severe,
            ChlorideRisk::Moderate => Severity::Moderate,
            ChlorideRisk::Low => Severity::Satisfactory,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            ChlorideRisk::High => {
                "High chloride content makes reinforcement corrosion likely. Carry out chloride extraction or cathodic protection."
            }
            ChlorideRisk::Moderate => {
                "Moderate chloride content. Monitor corrosion activity and apply a protective surface treatment."
            }
            ChlorideRisk::Low => "Chloride content is low. No action required.",
        }
    }
}

const RISK: ThresholdTable<ChlorideRisk> = ThresholdTable::new(
    &[
        (Bound::AtLeast(0.30), ChlorideRisk::High),
        (Bound::AtLeast(0.15), ChlorideRisk::Moderate),
    ],
    ChlorideRisk::Low,
);

pub fn classify(content: f64) -> ChlorideRisk {
    RISK.classify(content)
}

pub struct Chloride;

impl Evaluator for Chloride {
    fn test(&self) -> NdtTest {
        NdtTest::Chloride
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let content = measurements.number("content");
        derived(classify(content), [("content", content)])
    }
}
