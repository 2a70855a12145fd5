use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for the audit a form belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(pub String);

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ten non-destructive tests an auditor can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NdtTest {
    ReboundHammer,
    UltrasonicPulseVelocity,
    CoreSampling,
    Carbonation,
    Chloride,
    Sulfate,
    HalfCellPotential,
    ConcreteCover,
    RebarDiameterReduction,
    CrushingStrength,
}

impl NdtTest {
    pub const ALL: [NdtTest; 10] = [
        NdtTest::ReboundHammer,
        NdtTest::UltrasonicPulseVelocity,
        NdtTest::CoreSampling,
        NdtTest::Carbonation,
        NdtTest::Chloride,
        NdtTest::Sulfate,
        NdtTest::HalfCellPotential,
        NdtTest::ConcreteCover,
        NdtTest::RebarDiameterReduction,
        NdtTest::CrushingStrength,
    ];

    /// Stable key used in URLs and flattened submission field names.
    pub const fn key(self) -> &'static str {
        match self {
            NdtTest::ReboundHammer => "rebound_hammer",
            NdtTest::UltrasonicPulseVelocity => "ultrasonic_pulse_velocity",
            NdtTest::CoreSampling => "core_sampling",
            NdtTest::Carbonation => "carbonation",
            NdtTest::Chloride => "chloride",
            NdtTest::Sulfate => "sulfate",
            NdtTest::HalfCellPotential => "half_cell_potential",
            NdtTest::ConcreteCover => "concrete_cover",
            NdtTest::RebarDiameterReduction => "rebar_diameter_reduction",
            NdtTest::CrushingStrength => "crushing_strength",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            NdtTest::ReboundHammer => "Rebound Hammer",
            NdtTest::UltrasonicPulseVelocity => "Ultrasonic Pulse Velocity",
            NdtTest::CoreSampling => "Core Sampling",
            NdtTest::Carbonation => "Carbonation",
            NdtTest::Chloride => "Chloride Content",
            NdtTest::Sulfate => "Sulfate Content",
            NdtTest::HalfCellPotential => "Half-Cell Potential",
            NdtTest::ConcreteCover => "Concrete Cover",
            NdtTest::RebarDiameterReduction => "Rebar Diameter Reduction",
            NdtTest::CrushingStrength => "Crushing Strength",
        }
    }
}

impl fmt::Display for NdtTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown NDT test '{0}'")]
pub struct UnknownTest(pub String);

impl FromStr for NdtTest {
    type Err = UnknownTest;

    /// Accepts the snake_case key as well as kebab-case and the display title.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        NdtTest::ALL
            .into_iter()
            .find(|test| {
                test.key() == normalized
                    || test.title().to_ascii_lowercase().replace(['-', ' '], "_") == normalized
            })
            .ok_or_else(|| UnknownTest(raw.to_string()))
    }
}

/// Whether the auditor performed a test at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestToggle {
    #[default]
    Undecided,
    Performed,
    Skipped,
}

impl TestToggle {
    pub const fn label(self) -> &'static str {
        match self {
            TestToggle::Undecided => "undecided",
            TestToggle::Performed => "performed",
            TestToggle::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse ordering of tiers across tests, worst last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Satisfactory,
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Satisfactory => "Satisfactory",
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

/// Output of one evaluator. An empty result (no tier) stands in for a stored result that
/// could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub recommendation: String,
    #[serde(default)]
    pub quantities: BTreeMap<String, f64>,
}

impl DerivedResult {
    pub fn is_empty(&self) -> bool {
        self.tier.is_empty() && self.recommendation.is_empty() && self.quantities.is_empty()
    }

    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.quantities.get(name).copied()
    }
}
