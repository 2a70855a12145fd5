use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Pulse velocity in km/s.
pub const FIELDS: &[&str] = &["velocity"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseQuality {
    VeryGood,
    Good,
    Medium,
    Poor,
    VeryPoor,
}

impl Tier for PulseQuality {
    fn label(self) -> &'static str {
        match self {
            PulseQuality::VeryGood => "Very Good",
            PulseQuality::Good => "Good",
            PulseQuality::Medium => "Medium",
            PulseQuality::Poor => "Poor",
            PulseQuality::VeryPoor => "Very Poor",
        }
    }

    fn severity(self) -> Severity {
        match self {
            PulseQuality::VeryGood | PulseQuality::Good => Severity::Satisfactory,
            PulseQuality::Medium => Severity::Minor,
            PulseQuality::Poor => Severity::Moderate,
            PulseQuality::VeryPoor => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            PulseQuality::VeryGood => {
                "Pulse velocity indicates very good concrete homogeneity. No further action required."
            }
            PulseQuality::Good => {
                "Pulse velocity indicates good concrete. Routine monitoring is sufficient."
            }
            PulseQuality::Medium => {
                "Pulse velocity indicates medium quality concrete. Investigate for voids or honeycombing."
            }
            PulseQuality::Poor => {
                "Pulse velocity indicates poor concrete. Carry out core testing to confirm in-situ strength."
            }
            PulseQuality::VeryPoor => {
                "No usable pulse velocity recorded or the concrete is severely deteriorated. Repeat the test and assess the member in detail."
            }
        }
    }
}

const QUALITY: ThresholdTable<PulseQuality> = ThresholdTable::new(
    &[
        (Bound::Above(4.5), PulseQuality::VeryGood),
        (Bound::AtLeast(3.5), PulseQuality::Good),
        (Bound::AtLeast(3.0), PulseQuality::Medium),
        (Bound::Above(0.0), PulseQuality::Poor),
    ],
    PulseQuality::VeryPoor,
);

pub fn classify(velocity: f64) -> PulseQuality {
    QUALITY.classify(velocity)
}

pub struct UltrasonicPulseVelocity;

impl Evaluator for UltrasonicPulseVelocity {
    fn test(&self) -> NdtTest {
        NdtTest::UltrasonicPulseVelocity
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let velocity = measurements.number("velocity");
        derived(classify(velocity), [("velocity", velocity)])
    }
}
