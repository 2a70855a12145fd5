use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Cube crushing strength as a percentage of the characteristic strength.
pub const FIELDS: &[&str] = &["strength"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthGrade {
    Good,
    SlightlyLower,
    Weak,
    HighlyDefective,
}

impl Tier for StrengthGrade {
    fn label(self) -> &'static str {
        match self {
            StrengthGrade::Good => "Good",
            StrengthGrade::SlightlyLower => "Slightly Lower",
            StrengthGrade::Weak => "Weak",
            StrengthGrade::HighlyDefective => "Highly Defective",
        }
    }

    fn severity(self) -> Severity {
        match self {
            StrengthGrade::Good => Severity::Satisfactory,
            StrengthGrade::SlightlyLower => Severity::Minor,
            StrengthGrade::Weak => Severity::Moderate,
            StrengthGrade::HighlyDefective => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            StrengthGrade::Good => {
                "Crushing strength meets the characteristic strength. No action required."
            }
            StrengthGrade::SlightlyLower => {
                "Crushing strength is slightly below the characteristic strength. Monitor the member."
            }
            StrengthGrade::Weak => {
                "Crushing strength indicates weak concrete. Strengthening should be considered."
            }
            StrengthGrade::HighlyDefective => {
                "Crushing strength indicates highly defective concrete. Immediate intervention is required."
            }
        }
    }
}

const GRADE: ThresholdTable<StrengthGrade> = ThresholdTable::new(
    &[
        (Bound::AtLeast(85.0), StrengthGrade::Good),
        (Bound::AtLeast(75.0), StrengthGrade::SlightlyLower),
        (Bound::AtLeast(50.0), StrengthGrade::Weak),
    ],
    StrengthGrade::HighlyDefective,
);

pub fn classify(strength: f64) -> StrengthGrade {
    GRADE.classify(strength)
}

pub struct CrushingStrength;

impl Evaluator for CrushingStrength {
    fn test(&self) -> NdtTest {
        NdtTest::CrushingStrength
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let strength = measurements.number("strength");
        derived(classify(strength), [("strength", strength)])
    }
}
