use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Nominal and measured bar diameter in mm.
pub const FIELDS: &[&str] = &["original_diameter", "measured_diameter"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLoss {
    Intact,
    Low,
    Moderate,
    High,
}

impl Tier for SectionLoss {
    fn label(self) -> &'static str {
        match self {
            SectionLoss::Intact => "No Section Loss",
            SectionLoss::Low => "Low Impact",
            SectionLoss::Moderate => "Moderate Impact",
            SectionLoss::High => "High Impact",
        }
    }

    fn severity(self) -> Severity {
        match self {
            SectionLoss::Intact => Severity::Satisfactory,
            SectionLoss::Low => Severity::Minor,
            SectionLoss::Moderate => Severity::Moderate,
            SectionLoss::High => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            SectionLoss::Intact => "No measurable loss of reinforcement section.",
            SectionLoss::Low => {
                "Low section loss. Clean the reinforcement and apply a corrosion inhibitor."
            }
            SectionLoss::Moderate => {
                "Moderate section loss. Treat the corrosion and verify the member's load capacity."
            }
            SectionLoss::High => {
                "High section loss. Provide supplementary reinforcement or strengthen the member."
            }
        }
    }
}

const LOSS: ThresholdTable<SectionLoss> = ThresholdTable::new(
    &[
        (Bound::AtMost(0.0), SectionLoss::Intact),
        (Bound::Above(20.0), SectionLoss::High),
        (Bound::AtLeast(10.0), SectionLoss::Moderate),
    ],
    SectionLoss::Low,
);

pub fn classify(reduction_percent: f64) -> SectionLoss {
    LOSS.classify(reduction_percent)
}

/// Percentage loss of bar diameter. A non-positive original diameter is read as 1 mm.
pub fn reduction_percent(original: f64, measured: f64) -> f64 {
    let original = if original > 0.0 { original } else { 1.0 };
    (original - measured) / original * 100.0
}

pub struct RebarDiameterReduction;

impl Evaluator for RebarDiameterReduction {
    fn test(&self) -> NdtTest {
        NdtTest::RebarDiameterReduction
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let reduction = reduction_percent(
            measurements.number("original_diameter"),
            measurements.number("measured_diameter"),
        );
        derived(classify(reduction), [("reduction_percent", reduction)])
    }
}
