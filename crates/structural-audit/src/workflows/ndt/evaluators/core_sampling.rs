use std::f64::consts::PI;

use super::{derived, Evaluator, Tier};
use crate::workflows::ndt::domain::{DerivedResult, NdtTest, Severity};
use crate::workflows::ndt::measurement::Measurements;
use crate::workflows::ndt::thresholds::{Bound, ThresholdTable};

/// Core length and diameter in mm, measured strength, core weight in kg.
pub const FIELDS: &[&str] = &["length", "diameter", "measured_strength", "weight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCondition {
    MeetsCriteria,
    SlightlyLower,
    Weak,
    HighlyDefective,
}

impl Tier for CoreCondition {
    fn label(self) -> &'static str {
        match self {
            CoreCondition::MeetsCriteria => "Meets Acceptance Criteria",
            CoreCondition::SlightlyLower => "Slightly Lower Than Expected",
            CoreCondition::Weak => "Weak Concrete",
            CoreCondition::HighlyDefective => "Highly Defective",
        }
    }

    fn severity(self) -> Severity {
        match self {
            CoreCondition::MeetsCriteria => Severity::Satisfactory,
            CoreCondition::SlightlyLower => Severity::Minor,
            CoreCondition::Weak => Severity::Moderate,
            CoreCondition::HighlyDefective => Severity::Severe,
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            CoreCondition::MeetsCriteria => {
                "Core strength meets the acceptance criteria. No remedial action required."
            }
            CoreCondition::SlightlyLower => {
                "Core strength is slightly lower than expected. Review design loads and monitor the member."
            }
            CoreCondition::Weak => {
                "Core strength indicates weak concrete. Structural strengthening should be considered."
            }
            CoreCondition::HighlyDefective => {
                "Core strength indicates highly defective concrete. Immediate structural intervention or replacement is required."
            }
        }
    }
}

const CORRECTION: ThresholdTable<f64> = ThresholdTable::new(
    &[
        (Bound::AtLeast(2.0), 1.0),
        (Bound::AtLeast(1.75), 0.98),
        (Bound::AtLeast(1.5), 0.96),
        (Bound::AtLeast(1.25), 0.93),
    ],
    0.90,
);

const CONDITION: ThresholdTable<CoreCondition> = ThresholdTable::new(
    &[
        (Bound::AtLeast(85.0), CoreCondition::MeetsCriteria),
        (Bound::AtLeast(75.0), CoreCondition::SlightlyLower),
        (Bound::AtLeast(50.0), CoreCondition::Weak),
    ],
    CoreCondition::HighlyDefective,
);

/// Strength correction factor for a core's length/diameter ratio.
pub fn correction_factor(ld_ratio: f64) -> f64 {
    CORRECTION.classify(ld_ratio)
}

pub fn classify(corrected_strength: f64) -> CoreCondition {
    CONDITION.classify(corrected_strength)
}

fn effective_diameter(diameter: f64) -> f64 {
    if diameter > 0.0 {
        diameter
    } else {
        1.0
    }
}

/// Quantities derived from a single drilled core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreDerivation {
    pub ld_ratio: f64,
    pub correction_factor: f64,
    pub corrected_strength: f64,
    pub density: f64,
}

pub fn derive_core(length: f64, diameter: f64, measured_strength: f64, weight: f64) -> CoreDerivation {
    let diameter = effective_diameter(diameter);
    let ld_ratio = length / diameter;
    let factor = correction_factor(ld_ratio);

    let radius_m = diameter / 2000.0;
    let volume = PI * radius_m * radius_m * (length / 1000.0);
    let density = if volume > 0.0 { weight / volume } else { 0.0 };

    CoreDerivation {
        ld_ratio,
        correction_factor: factor,
        corrected_strength: measured_strength * factor,
        density,
    }
}

pub struct CoreSampling;

impl Evaluator for CoreSampling {
    fn test(&self) -> NdtTest {
        NdtTest::CoreSampling
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult {
        let core = derive_core(
            measurements.number("length"),
            measurements.number("diameter"),
            measurements.number("measured_strength"),
            measurements.number("weight"),
        );

        derived(
            classify(core.corrected_strength),
            [
                ("ld_ratio", core.ld_ratio),
                ("correction_factor", core.correction_factor),
                ("corrected_strength", core.corrected_strength),
                ("density", core.density),
            ],
        )
    }
}
