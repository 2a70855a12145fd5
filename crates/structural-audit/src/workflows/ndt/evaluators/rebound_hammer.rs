use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

pub const FIELDS: &[&str] = &["reading_1", "reading_2", "reading_3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReboundQuality {
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Tier for ReboundQuality {
    fn label(self) -> &'static str {
        match self {
            ReboundQuality::VeryGood => "Very Good",
            ReboundQuality::Good => "Good",
            ReboundQuality::Fair => "Fair",
            ReboundQuality::Poor => "Poor",
        }
    }

    fn severity(self) -> Severity {
        match self {
            ReboundQuality::VeryGood | ReboundQuality::Good => Severity::Satisfactory,
            ReboundQuality::Fair => Severity::Minor,
            ReboundQuality::Poor => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            ReboundQuality::VeryGood => {
                "Surface hardness indicates very good concrete. No further action required."
            }
            ReboundQuality::Good => {
                "Surface hardness indicates good concrete. Routine monitoring is sufficient."
            }
            ReboundQuality::Fair => {
                "Concrete quality is fair. Confirm strength with core sampling or ultrasonic pulse velocity testing."
            }
            ReboundQuality::Poor => {
                "Concrete quality is poor. Carry out core testing and a detailed structural assessment."
            }
        }
    }
}

const QUALITY: ThresholdTable<ReboundQuality> = ThresholdTable::new(
    &[
        (Bound::Above(40.0), ReboundQuality::VeryGood),
        (Bound::AtLeast(30.0), ReboundQuality::Good),
        (Bound::AtLeast(20.0), ReboundQuality::Fair),
    ],
    ReboundQuality::Poor,
);

pub fn classify(rebound_index: f64) -> ReboundQuality {
    QUALITY.classify(rebound_index)
}

/// Mean of the positive readings; zero or negative readings are treated as not taken.
pub fn rebound_index(readings: &[f64]) -> f64 {
    let valid: Vec<f64> = readings.iter().copied().filter(|value| *value > 0.0).collect();
    if valid.is_empty() {
        return 0.0;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

pub struct ReboundHammer;

impl Evaluator for ReboundHammer {
    fn test(&self) -> NdtTest {
        NdtTest::ReboundHammer
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let readings: Vec<f64> = FIELDS
            .iter()
            .map(|field| measurements.number(field))
            .collect();
        let index = rebound_index(&readings);
        let valid = readings.iter().filter(|value| **value > 0.0).count();

        derived(
            classify(index),
            [("rebound_index", index), ("valid_readings", valid as f64)],
        )
    }
}
