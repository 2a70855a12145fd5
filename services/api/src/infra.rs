use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use structural_audit::workflows::ndt::{
    AuditId, MeasurementValue, NdtTest, PersistedSubmission, PhotoAttachment, RepositoryError,
    SubmissionPayload, SubmissionReceipt, SubmissionRepository, SubmissionStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local submission store used by the service and the CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    submissions: Arc<Mutex<HashMap<AuditId, PersistedSubmission>>>,
}

impl InMemorySubmissionRepository {
    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<AuditId, PersistedSubmission>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn submission_status(&self, audit_id: &AuditId) -> Result<SubmissionStatus, RepositoryError> {
        Ok(self
            .guard()
            .get(audit_id)
            .map(|stored| stored.status.clone())
            .unwrap_or_default())
    }

    fn persist(&self, payload: SubmissionPayload) -> Result<SubmissionReceipt, RepositoryError> {
        let mut guard = self.guard();
        if guard.contains_key(&payload.audit_id) {
            return Err(RepositoryError::Conflict);
        }

        let receipt = SubmissionReceipt {
            audit_id: payload.audit_id.clone(),
            reference: format!("NDT-{:05}", guard.len() + 1),
            submitted_at: Utc::now(),
        };
        guard.insert(
            payload.audit_id.clone(),
            PersistedSubmission {
                audit_id: payload.audit_id,
                status: SubmissionStatus::from(&receipt),
                fields: payload.fields,
            },
        );
        Ok(receipt)
    }

    fn fetch(&self, audit_id: &AuditId) -> Result<Option<PersistedSubmission>, RepositoryError> {
        Ok(self.guard().get(audit_id).cloned())
    }
}

/// Parse a `field=value` measurement argument.
pub(crate) fn parse_measurement_arg(raw: &str) -> Result<(String, MeasurementValue), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((field.to_string(), MeasurementValue::from(value.trim())))
}

pub(crate) fn parse_test(raw: &str) -> Result<NdtTest, String> {
    raw.parse::<NdtTest>().map_err(|err| err.to_string())
}

/// Parse a `test=path` photo argument.
pub(crate) fn parse_photo_arg(raw: &str) -> Result<(NdtTest, PathBuf), String> {
    let (test, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TEST=PATH, got '{raw}'"))?;
    Ok((parse_test(test)?, PathBuf::from(path.trim())))
}

/// Read a photo from disk, guessing its content type from the extension.
pub(crate) fn load_photo(test: NdtTest, path: &Path) -> std::io::Result<PhotoAttachment> {
    let bytes = std::fs::read(path)?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(PhotoAttachment {
        test,
        file_name,
        content_type,
        bytes,
    })
}
