use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Half-cell potential in mV. More negative readings mean a higher corrosion risk.
pub const FIELDS: &[&str] = &["potential"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrosionRisk {
    Low,
    Moderate,
    High,
}

impl CorrosionRisk {
    /// Probability of active corrosion, in percent.
    pub const fn probability(self) -> u8 {
        match self {
            CorrosionRisk::Low => 10,
            CorrosionRisk::Moderate => 50,
            CorrosionRisk::High => 90,
        }
    }
}

impl Tier for CorrosionRisk {
    fn label(self) -> &'static str {
        match self {
            CorrosionRisk::Low => "Low Risk",
            CorrosionRisk::Moderate => "Moderate Risk",
            CorrosionRisk::High => "High Risk",
        }
    }

    fn severity(self) -> Severity {
        match self {
            CorrosionRisk::Low => Severity::Satisfactory,
            CorrosionRisk::Moderate => Severity::Moderate,
            CorrosionRisk::High => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            CorrosionRisk::Low => {
                "Low (10%) probability of reinforcement corrosion. No action required."
            }
            CorrosionRisk::Moderate => {
                "Moderate (50%) probability of corrosion. Monitor periodically and investigate further."
            }
            CorrosionRisk::High => {
                "High (90%) probability of active corrosion. Expose the reinforcement and carry out repairs."
            }
        }
    }
}

const RISK: ThresholdTable<CorrosionRisk> = ThresholdTable::new(
    &[
        (Bound::Above(-200.0), CorrosionRisk::Low),
        (Bound::AtLeast(-350.0), CorrosionRisk::Moderate),
    ],
    CorrosionRisk::High,
);

pub fn classify(potential: f64) -> CorrosionRisk {
    RISK.classify(potential)
}

pub struct HalfCellPotential;

impl Evaluator for HalfCellPotential {
    fn test(&self) -> NdtTest {
        NdtTest::HalfCellPotential
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let potential = measurements.number("potential");
        let risk = classify(potential);
        derived(
            risk,
            [
                ("potential", potential),
                ("corrosion_probability", f64::from(risk.probability())),
            ],
        )
    }
}
