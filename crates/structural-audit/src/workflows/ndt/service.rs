use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::domain::{AuditId, DerivedResult, NdtTest, TestToggle};
use super::form::{FormError, NdtFormState, TestEntry};
use super::measurement::{MeasurementValue, Measurements};
use super::report::NdtReport;
use super::repository::{RepositoryError, SubmissionRepository};
use super::submission::{
    build_submission, restore_form, PhotoAttachment, SubmissionError, SubmissionLimits,
    SubmissionReceipt,
};

/// Server-side orchestrator: keeps one draft per mounted audit and hands finished forms to
/// persistence exactly once per submit call. Submitted forms are not kept in memory; they are
/// rebuilt from persistence whenever they are read.
pub struct NdtFormService<R> {
    repository: Arc<R>,
    limits: SubmissionLimits,
    forms: Mutex<HashMap<AuditId, NdtFormState>>,
    in_flight: Arc<Mutex<HashSet<AuditId>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the audit's in-flight marker when the submit attempt ends, success or not.
struct InFlightGuard {
    audit_id: AuditId,
    in_flight: Arc<Mutex<HashSet<AuditId>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.audit_id);
    }
}

impl<R> NdtFormService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>, limits: SubmissionLimits) -> Self {
        Self {
            repository,
            limits,
            forms: Mutex::new(HashMap::new()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Open the NDT step for an audit.
    ///
    /// Submission status comes from persistence: a submitted audit is rebuilt read-only from
    /// its stored fields, otherwise the existing draft (or a fresh one) is returned.
    pub fn mount(&self, audit_id: &AuditId) -> Result<NdtFormState, FormServiceError> {
        if let Some(form) = self.restore_submitted(audit_id)? {
            info!(%audit_id, "mounted submitted NDT form read-only");
            return Ok(form);
        }

        let mut forms = lock(&self.forms);
        let form = forms
            .entry(audit_id.clone())
            .or_insert_with(|| NdtFormState::new(audit_id.clone()));
        Ok(form.clone())
    }

    /// Replace an audit's draft with a form built elsewhere, e.g. from an imported field log.
    pub fn load(&self, form: NdtFormState) -> Result<NdtFormState, FormServiceError> {
        let audit_id = form.audit_id().clone();
        if form.is_read_only() || self.repository.submission_status(&audit_id)?.is_submitted() {
            return Err(FormError::ReadOnly { audit_id }.into());
        }

        let mut forms = lock(&self.forms);
        if lock(&self.in_flight).contains(&audit_id) {
            return Err(FormServiceError::InFlight(audit_id));
        }

        info!(%audit_id, "loaded NDT draft");
        forms.insert(audit_id, form.clone());
        Ok(form)
    }

    pub fn form(&self, audit_id: &AuditId) -> Result<NdtFormState, FormServiceError> {
        if let Some(form) = lock(&self.forms).get(audit_id).cloned() {
            return Ok(form);
        }

        self.restore_submitted(audit_id)?
            .ok_or_else(|| FormServiceError::NotMounted(audit_id.clone()))
    }

    pub fn set_toggle(
        &self,
        audit_id: &AuditId,
        test: NdtTest,
        toggle: TestToggle,
    ) -> Result<TestEntry, FormServiceError> {
        self.with_draft(audit_id, |form| {
            form.set_toggle(test, toggle)?;
            Ok(form.entry(test).clone())
        })
    }

    pub fn record_measurement(
        &self,
        audit_id: &AuditId,
        test: NdtTest,
        field: &str,
        value: MeasurementValue,
    ) -> Result<DerivedResult, FormServiceError> {
        self.with_draft(audit_id, |form| {
            Ok(form.record_measurement(test, field, value)?.clone())
        })
    }

    pub fn replace_measurements(
        &self,
        audit_id: &AuditId,
        test: NdtTest,
        measurements: Measurements,
    ) -> Result<DerivedResult, FormServiceError> {
        self.with_draft(audit_id, |form| {
            Ok(form.replace_measurements(test, measurements)?.clone())
        })
    }

    /// Submit the audit's form with its photos.
    ///
    /// Persistence is called once, outside the form lock. On success the draft is discarded
    /// and later reads rebuild the submitted form from persistence. On failure the form is
    /// left as it was and stays editable, so the caller can simply submit again.
    pub fn submit(
        &self,
        audit_id: &AuditId,
        photos: Vec<PhotoAttachment>,
    ) -> Result<SubmissionReceipt, FormServiceError> {
        let (_guard, snapshot) = self.begin_submit(audit_id)?;
        let payload = build_submission(&snapshot, photos, self.limits)?;
        let field_count = payload.fields.len();
        let photo_count = payload.photos.len();

        let receipt = match self.repository.persist(payload) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(%audit_id, error = %err, "NDT submission failed; form left editable");
                return Err(err.into());
            }
        };

        // the in-flight guard is still held, so no edit can race the eviction
        lock(&self.forms).remove(audit_id);

        info!(
            %audit_id,
            reference = %receipt.reference,
            fields = field_count,
            photos = photo_count,
            "NDT submission stored"
        );
        Ok(receipt)
    }

    pub fn report(&self, audit_id: &AuditId) -> Result<NdtReport, FormServiceError> {
        let form = self.form(audit_id)?;
        Ok(NdtReport::from_form(&form))
    }

    /// Mark the audit in flight and snapshot its form under the same lock, so no edit can
    /// land between the snapshot and the persist call.
    fn begin_submit(
        &self,
        audit_id: &AuditId,
    ) -> Result<(InFlightGuard, NdtFormState), FormServiceError> {
        {
            let forms = lock(&self.forms);
            if let Some(snapshot) = forms.get(audit_id).cloned() {
                if !lock(&self.in_flight).insert(audit_id.clone()) {
                    return Err(FormServiceError::InFlight(audit_id.clone()));
                }

                let guard = InFlightGuard {
                    audit_id: audit_id.clone(),
                    in_flight: Arc::clone(&self.in_flight),
                };
                return Ok((guard, snapshot));
            }
        }

        Err(self.missing_draft(audit_id))
    }

    fn with_draft<T>(
        &self,
        audit_id: &AuditId,
        edit: impl FnOnce(&mut NdtFormState) -> Result<T, FormServiceError>,
    ) -> Result<T, FormServiceError> {
        {
            let mut forms = lock(&self.forms);
            if lock(&self.in_flight).contains(audit_id) {
                return Err(FormServiceError::InFlight(audit_id.clone()));
            }
            if let Some(form) = forms.get_mut(audit_id) {
                return edit(form);
            }
        }

        Err(self.missing_draft(audit_id))
    }

    /// Rebuild a submitted form from persistence. `None` while the audit is still a draft.
    fn restore_submitted(
        &self,
        audit_id: &AuditId,
    ) -> Result<Option<NdtFormState>, FormServiceError> {
        let status = self.repository.submission_status(audit_id)?;
        if !status.is_submitted() {
            return Ok(None);
        }

        let form = match self.repository.fetch(audit_id)? {
            Some(stored) => restore_form(stored.audit_id, &stored.fields, status),
            None => NdtFormState::restore(audit_id.clone(), Default::default(), status),
        };
        Ok(Some(form))
    }

    /// Error for an audit with no draft in memory: read-only once submitted, otherwise not
    /// mounted. Called without holding the forms lock.
    fn missing_draft(&self, audit_id: &AuditId) -> FormServiceError {
        match self.repository.submission_status(audit_id) {
            Ok(status) if status.is_submitted() => FormError::ReadOnly {
                audit_id: audit_id.clone(),
            }
            .into(),
            Ok(_) => FormServiceError::NotMounted(audit_id.clone()),
            Err(err) => err.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn holds_draft(&self, audit_id: &AuditId) -> bool {
        lock(&self.forms).contains_key(audit_id)
    }
}

/// Error raised by the NDT form service.
#[derive(Debug, thiserror::Error)]
pub enum FormServiceError {
    #[error("no NDT form mounted for audit {0}")]
    NotMounted(AuditId),
    #[error("a submission for audit {0} is already in flight")]
    InFlight(AuditId),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
