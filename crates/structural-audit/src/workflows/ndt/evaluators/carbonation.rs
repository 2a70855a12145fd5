use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Carbonation depth in mm and the pH indicated at that depth.
pub const FIELDS: &[&str] = &["depth", "ph"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarbonationStatus {
    RemedialActionRequired,
    Satisfactory,
}

impl Tier for CarbonationStatus {
    fn label(self) -> &'static str {
        match self {
            CarbonationStatus::RemedialActionRequired => "Remedial Action Required",
            CarbonationStatus::Satisfactory => "Satisfactory",
        }
    }

    fn severity(self) -> Severity {
        match self {
            CarbonationStatus::RemedialActionRequired => Severity::Moderate,
            CarbonationStatus::Satisfactory => Severity::Satisfactory,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            CarbonationStatus::RemedialActionRequired => {
                "Carbonation has reached 20 mm or more. Re-alkalise the concrete or apply an anti-carbonation coating."
            }
            CarbonationStatus::Satisfactory => {
                "Carbonation depth is within acceptable limits. No action required."
            }
        }
    }
}

const STATUS: ThresholdTable<CarbonationStatus> = ThresholdTable::new(
    &[(Bound::AtLeast(20.0), CarbonationStatus::RemedialActionRequired)],
    CarbonationStatus::Satisfactory,
);

pub fn classify(depth: f64) -> CarbonationStatus {
    STATUS.classify(depth)
}

pub struct Carbonation;

impl Evaluator for Carbonation {
    fn test(&self) -> NdtTest {
        NdtTest::Carbonation
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let depth = measurements.number("depth");
        let ph = measurements.number("ph");
        derived(classify(depth), [("depth", depth), ("ph", ph)])
    }
}
