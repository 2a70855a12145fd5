use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw, operator-entered value exactly as the form supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Empty,
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl MeasurementValue {
    /// Text form used when the value is flattened into a submission payload. Flags are
    /// written as `1`/`0` so a restored form parses them to the same number.
    pub fn to_field_text(&self) -> String {
        match self {
            MeasurementValue::Number(value) => value.to_string(),
            MeasurementValue::Flag(true) => "1".to_string(),
            MeasurementValue::Flag(false) => "0".to_string(),
            MeasurementValue::Text(value) => value.clone(),
            MeasurementValue::Empty => String::new(),
        }
    }
}

/// Coerce a raw value to a number, falling back to `0.0`.
///
/// Strings are trimmed and parsed strictly (`"12abc"` is not 12); empty strings, unparsable
/// text, nulls and non-finite numbers all become zero. Booleans count as 1 and 0. Evaluators
/// never see `NaN` or infinity.
pub fn parse_measurement(value: Option<&MeasurementValue>) -> f64 {
    let parsed = match value {
        None | Some(MeasurementValue::Empty) => 0.0,
        Some(MeasurementValue::Number(number)) => *number,
        Some(MeasurementValue::Flag(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Some(MeasurementValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Named raw fields for one test. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements {
    fields: BTreeMap<String, MeasurementValue>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<MeasurementValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<MeasurementValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&MeasurementValue> {
        self.fields.get(field)
    }

    /// Numeric view of a field with zero fallback.
    pub fn number(&self, field: &str) -> f64 {
        parse_measurement(self.fields.get(field))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasurementValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<MeasurementValue>> FromIterator<(K, V)> for Measurements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
