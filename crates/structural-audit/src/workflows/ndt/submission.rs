use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AuditId, DerivedResult, NdtTest, TestToggle};
use super::evaluators::evaluator_for;
use super::form::{NdtFormState, TestEntry};
use super::measurement::MeasurementValue;
use crate::config::NdtConfig;

const STATUS_SUFFIX: &str = "status";
const TIER_SUFFIX: &str = "tier";
const RECOMMENDATION_SUFFIX: &str = "recommendation";
const RESULT_SUFFIX: &str = "result";

/// Whether an audit's NDT step has been handed to persistence. Owned by the persistence
/// collaborator and fetched when a form is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Draft,
    Submitted {
        submitted_at: DateTime<Utc>,
        reference: String,
    },
}

impl SubmissionStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionStatus::Submitted { .. })
    }
}

/// Acknowledgement returned by persistence for a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub audit_id: AuditId,
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&SubmissionReceipt> for SubmissionStatus {
    fn from(receipt: &SubmissionReceipt) -> Self {
        SubmissionStatus::Submitted {
            submitted_at: receipt.submitted_at,
            reference: receipt.reference.clone(),
        }
    }
}

/// Site photo attached to a performed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    pub test: NdtTest,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One flattened multipart text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// The outbound object handed to persistence for one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub audit_id: AuditId,
    pub fields: Vec<FormField>,
    pub photos: Vec<PhotoAttachment>,
}

impl SubmissionPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// Attachment limits enforced before a payload is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    pub max_photos: usize,
    pub max_photo_bytes: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self::from(&NdtConfig::default())
    }
}

impl From<&NdtConfig> for SubmissionLimits {
    fn from(config: &NdtConfig) -> Self {
        Self {
            max_photos: config.max_photos,
            max_photo_bytes: config.max_photo_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("NDT form for audit {0} was already submitted")]
    AlreadySubmitted(AuditId),
    #[error("too many photos attached (max {max}, found {found})")]
    TooManyPhotos { max: usize, found: usize },
    #[error("photo '{file_name}' is {found} bytes, above the {max} byte limit")]
    PhotoTooLarge {
        file_name: String,
        max: usize,
        found: usize,
    },
    #[error("photo '{file_name}' has unsupported content type '{content_type}'")]
    UnsupportedPhotoType {
        file_name: String,
        content_type: String,
    },
    #[error("photo '{file_name}' is attached to {test}, which was not performed")]
    PhotoForInactiveTest { file_name: String, test: NdtTest },
    #[error("failed to encode derived result: {0}")]
    Encoding(#[from] serde_json::Error),
}

fn field_name(test: NdtTest, suffix: &str) -> String {
    format!("{}_{}", test.key(), suffix)
}

fn validate_photos(
    form: &NdtFormState,
    photos: &[PhotoAttachment],
    limits: SubmissionLimits,
) -> Result<(), SubmissionError> {
    if photos.len() > limits.max_photos {
        return Err(SubmissionError::TooManyPhotos {
            max: limits.max_photos,
            found: photos.len(),
        });
    }

    for photo in photos {
        let is_image = photo
            .content_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(SubmissionError::UnsupportedPhotoType {
                file_name: photo.file_name.clone(),
                content_type: photo.content_type.clone(),
            });
        }

        if photo.bytes.len() > limits.max_photo_bytes {
            return Err(SubmissionError::PhotoTooLarge {
                file_name: photo.file_name.clone(),
                max: limits.max_photo_bytes,
                found: photo.bytes.len(),
            });
        }

        if form.toggle(photo.test) != TestToggle::Performed {
            return Err(SubmissionError::PhotoForInactiveTest {
                file_name: photo.file_name.clone(),
                test: photo.test,
            });
        }
    }

    Ok(())
}

/// Flatten a draft form and its photos into the multipart-style payload persistence accepts.
///
/// Per test: `<test>_status`, one `<test>_<field>` per measurement and, when a result exists,
/// `<test>_tier`, `<test>_recommendation` and `<test>_result` holding the whole result as JSON.
pub fn build_submission(
    form: &NdtFormState,
    photos: Vec<PhotoAttachment>,
    limits: SubmissionLimits,
) -> Result<SubmissionPayload, SubmissionError> {
    if form.is_read_only() {
        return Err(SubmissionError::AlreadySubmitted(form.audit_id().clone()));
    }
    validate_photos(form, &photos, limits)?;

    let mut fields = Vec::new();
    for (test, entry) in form.entries() {
        fields.push(FormField {
            name: field_name(test, STATUS_SUFFIX),
            value: entry.toggle.label().to_string(),
        });

        for (name, value) in entry.measurements.iter() {
            fields.push(FormField {
                name: field_name(test, name),
                value: value.to_field_text(),
            });
        }

        if let Some(result) = &entry.result {
            fields.push(FormField {
                name: field_name(test, TIER_SUFFIX),
                value: result.tier.clone(),
            });
            fields.push(FormField {
                name: field_name(test, RECOMMENDATION_SUFFIX),
                value: result.recommendation.clone(),
            });
            fields.push(FormField {
                name: field_name(test, RESULT_SUFFIX),
                value: serde_json::to_string(result)?,
            });
        }
    }

    Ok(SubmissionPayload {
        audit_id: form.audit_id().clone(),
        fields,
        photos,
    })
}

/// Decode a stored `<test>_result`. Anything unparsable becomes an empty result.
pub fn decode_persisted_result(raw: &str) -> DerivedResult {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_toggle(raw: &str) -> TestToggle {
    match raw.trim() {
        "performed" => TestToggle::Performed,
        "skipped" => TestToggle::Skipped,
        _ => TestToggle::Undecided,
    }
}

/// Rebuild a form from persisted flattened fields so a submission can be re-rendered.
///
/// Unrecognised field names are ignored. A performed test whose stored result cannot be
/// decoded carries an empty result rather than failing the render.
pub fn restore_form(
    audit_id: AuditId,
    fields: &[FormField],
    status: SubmissionStatus,
) -> NdtFormState {
    let mut entries: BTreeMap<NdtTest, TestEntry> = BTreeMap::new();

    for field in fields {
        let Some((test, suffix)) = split_field_name(&field.name) else {
            continue;
        };
        let entry = entries.entry(test).or_default();

        match suffix {
            STATUS_SUFFIX => entry.toggle = parse_toggle(&field.value),
            RESULT_SUFFIX => entry.result = Some(decode_persisted_result(&field.value)),
            TIER_SUFFIX | RECOMMENDATION_SUFFIX => {}
            measurement if evaluator_for(test).accepts(measurement) => {
                entry
                    .measurements
                    .insert(measurement, MeasurementValue::Text(field.value.clone()));
            }
            _ => {}
        }
    }

    for entry in entries.values_mut() {
        if entry.toggle == TestToggle::Performed && entry.result.is_none() {
            entry.result = Some(DerivedResult::default());
        }
    }

    NdtFormState::restore(audit_id, entries, status)
}

fn split_field_name(name: &str) -> Option<(NdtTest, &str)> {
    NdtTest::ALL.into_iter().find_map(|test| {
        name.strip_prefix(test.key())
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| (test, suffix))
    })
}
