use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::ndt::{
    ndt_router, AuditId, Measurements, NdtFormService, NdtFormState, NdtTest,
    PersistedSubmission, PhotoAttachment, RepositoryError, SubmissionLimits, SubmissionPayload,
    SubmissionReceipt, SubmissionRepository, SubmissionStatus, TestToggle,
};

pub(super) fn audit_id() -> AuditId {
    AuditId("AUD-2025-014".to_string())
}

pub(super) fn limits() -> SubmissionLimits {
    SubmissionLimits {
        max_photos: 2,
        max_photo_bytes: 1024,
    }
}

pub(super) fn photo(test: NdtTest, name: &str) -> PhotoAttachment {
    PhotoAttachment {
        test,
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

pub(super) fn rebound_readings() -> Measurements {
    Measurements::new()
        .with("reading_1", 38.0)
        .with("reading_2", 42.0)
        .with("reading_3", "40")
}

/// Draft with rebound hammer and half-cell performed, chloride skipped and the rest undecided.
pub(super) fn populated_form() -> NdtFormState {
    let mut form = NdtFormState::new(audit_id());
    form.set_toggle(NdtTest::ReboundHammer, TestToggle::Performed)
        .expect("toggle rebound");
    form.replace_measurements(NdtTest::ReboundHammer, rebound_readings())
        .expect("rebound readings");
    form.set_toggle(NdtTest::HalfCellPotential, TestToggle::Performed)
        .expect("toggle half-cell");
    form.record_measurement(NdtTest::HalfCellPotential, "potential", "-380".into())
        .expect("half-cell reading");
    form.set_toggle(NdtTest::Chloride, TestToggle::Skipped)
        .expect("skip chloride");
    form
}

/// The same form as it looks once persistence has acknowledged it.
pub(super) fn as_submitted(form: &NdtFormState) -> NdtFormState {
    let entries = form
        .entries()
        .map(|(test, entry)| (test, entry.clone()))
        .collect();
    NdtFormState::restore(
        form.audit_id().clone(),
        entries,
        SubmissionStatus::Submitted {
            submitted_at: submitted_at(),
            reference: "ndt-1".to_string(),
        },
    )
}

pub(super) fn submitted_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) stored: Arc<Mutex<HashMap<AuditId, PersistedSubmission>>>,
    pub(super) persist_calls: Arc<Mutex<usize>>,
}

impl MemoryRepository {
    pub(super) fn persist_count(&self) -> usize {
        *self.persist_calls.lock().expect("counter mutex poisoned")
    }

    pub(super) fn stored(&self, audit_id: &AuditId) -> Option<PersistedSubmission> {
        self.stored
            .lock()
            .expect("repository mutex poisoned")
            .get(audit_id)
            .cloned()
    }
}

impl SubmissionRepository for MemoryRepository {
    fn submission_status(&self, audit_id: &AuditId) -> Result<SubmissionStatus, RepositoryError> {
        let guard = self.stored.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(audit_id)
            .map(|stored| stored.status.clone())
            .unwrap_or_default())
    }

    fn persist(&self, payload: SubmissionPayload) -> Result<SubmissionReceipt, RepositoryError> {
        *self.persist_calls.lock().expect("counter mutex poisoned") += 1;
        let mut guard = self.stored.lock().expect("repository mutex poisoned");
        if guard.contains_key(&payload.audit_id) {
            return Err(RepositoryError::Conflict);
        }

        let receipt = SubmissionReceipt {
            audit_id: payload.audit_id.clone(),
            reference: format!("ndt-{}", guard.len() + 1),
            submitted_at: submitted_at(),
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
        let guard = self.stored.lock().expect("repository mutex poisoned");
        Ok(guard.get(audit_id).cloned())
    }
}

/// Reports every audit as a draft but refuses to store anything.
pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn submission_status(&self, _audit_id: &AuditId) -> Result<SubmissionStatus, RepositoryError> {
        Ok(SubmissionStatus::Draft)
    }

    fn persist(&self, _payload: SubmissionPayload) -> Result<SubmissionReceipt, RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".to_string()))
    }

    fn fetch(&self, _audit_id: &AuditId) -> Result<Option<PersistedSubmission>, RepositoryError> {
        Ok(None)
    }
}

pub(super) fn build_service() -> (NdtFormService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = NdtFormService::new(repository.clone(), limits());
    (service, repository)
}

pub(super) fn router_with_memory_repository(
    service: NdtFormService<MemoryRepository>,
) -> axum::Router {
    ndt_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
