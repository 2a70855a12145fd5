//! One evaluator per NDT test. Each reads its own raw fields, derives the test quantities,
//! classifies them against a threshold table, and attaches the advisory text for that tier.

pub mod carbonation;
pub mod chloride;
pub mod concrete_cover;
pub mod core_sampling;
pub mod crushing_strength;
pub mod half_cell;
pub mod rebar_reduction;
pub mod rebound_hammer;
pub mod sulfate;
pub mod ultrasonic_pulse;

use std::collections::BTreeMap;

use super::domain::{DerivedResult, NdtTest, Severity};
use super::measurement::Measurements;

/// Contract shared by every test calculator. `evaluate` is total and pure.
pub trait Evaluator: Send + Sync {
    fn test(&self) -> NdtTest;

    /// Raw field names this evaluator reads.
    fn fields(&self) -> &'static [&'static str];

    fn evaluate(&self, measurements: &Measurements) -> DerivedResult;

    fn accepts(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

/// A discrete classification with its fixed advisory text.
pub trait Tier: Copy {
    fn label(self) -> &'static str;
    fn severity(self) -> Severity;
    fn recommendation(self) -> &'static str;
}

pub(crate) fn derived<T: Tier>(
    tier: T,
    quantities: impl IntoIterator<Item = (&'static str, f64)>,
) -> DerivedResult {
    let quantities: BTreeMap<String, f64> = quantities
        .into_iter()
        .map(|(name, value)| (name.to_string(), if value.is_finite() { value } else { 0.0 }))
        .collect();

    DerivedResult {
        tier: tier.label().to_string(),
        severity: Some(tier.severity()),
        recommendation: tier.recommendation().to_string(),
        quantities,
    }
}

/// Look up the evaluator for a test.
pub fn evaluator_for(test: NdtTest) -> &'static dyn Evaluator {
    match test {
        NdtTest::ReboundHammer => &rebound_hammer::ReboundHammer,
        NdtTest::UltrasonicPulseVelocity => &ultrasonic_pulse::UltrasonicPulseVelocity,
        NdtTest::CoreSampling => &core_sampling::CoreSampling,
        NdtTest::Carbonation => &carbonation::Carbonation,
        NdtTest::Chloride => &chloride::Chloride,
        NdtTest::Sulfate => &sulfate::Sulfate,
        NdtTest::HalfCellPotential => &half_cell::HalfCellPotential,
        NdtTest::ConcreteCover => &concrete_cover::ConcreteCover,
        NdtTest::RebarDiameterReduction => &rebar_reduction::RebarDiameterReduction,
        NdtTest::CrushingStrength => &crushing_strength::CrushingStrength,
    }
}

/// Return all registered evaluators in wizard order.
pub fn all_evaluators() -> impl Iterator<Item = &'static dyn Evaluator> {
    NdtTest::ALL.into_iter().map(evaluator_for)
}

/// Evaluate a test's measurements with its registered evaluator.
pub fn evaluate(test: NdtTest, measurements: &Measurements) -> DerivedResult {
    evaluator_for(test).evaluate(measurements)
}
