use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Specified and measured cover in mm.
pub const FIELDS: &[&str] = &["required_cover", "measured_cover"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverAdequacy {
    Adequate,
    Minor,
    Moderate,
    Severe,
}

impl Tier for CoverAdequacy {
    fn label(self) -> &'static str {
        match self {
            CoverAdequacy::Adequate => "Adequate Cover",
            CoverAdequacy::Minor => "Minor Cover Deficiency",
            CoverAdequacy::Moderate => "Moderate Cover Deficiency",
            CoverAdequacy::Severe => "Severe Cover Deficiency",
        }
    }

    fn severity(self) -> Severity {
        match self {
            CoverAdequacy::Adequate => Severity::Satisfactory,
            CoverAdequacy::Minor => Severity::Minor,
            CoverAdequacy::Moderate => Severity::Moderate,
            CoverAdequacy::Severe => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            CoverAdequacy::Adequate => "Concrete cover meets the specified requirement.",
            CoverAdequacy::Minor => {
                "Minor cover deficiency. Apply a protective coating to the affected area."
            }
            CoverAdequacy::Moderate => {
                "Moderate cover deficiency. Restore cover with polymer-modified mortar."
            }
            CoverAdequacy::Severe => {
                "Severe cover deficiency leaves the reinforcement exposed to corrosion. Restore cover with micro-concrete or jacketing."
            }
        }
    }
}

const ADEQUACY: ThresholdTable<CoverAdequacy> = ThresholdTable::new(
    &[
        (Bound::AtMost(0.0), CoverAdequacy::Adequate),
        (Bound::Above(10.0), CoverAdequacy::Severe),
        (Bound::AtLeast(5.0), CoverAdequacy::Moderate),
    ],
    CoverAdequacy::Minor,
);

pub fn classify(deficiency: f64) -> CoverAdequacy {
    ADEQUACY.classify(deficiency)
}

pub struct ConcreteCover;

impl Evaluator for ConcreteCover {
    fn test(&self) -> NdtTest {
        NdtTest::ConcreteCover
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let required = measurements.number("required_cover");
        let measured = measurements.number("measured_cover");
        let deficiency = required - measured;

        derived(
            classify(deficiency),
            [
                ("required_cover", required),
                ("measured_cover", measured),
                ("deficiency", deficiency),
            ],
        )
    }
}
