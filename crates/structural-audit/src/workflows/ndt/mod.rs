//! Non-destructive testing: evaluators, the wizard form they feed, and submission to
//! persistence.

pub mod domain;
pub mod evaluators;
pub mod form;
pub mod import;
pub mod measurement;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use domain::{AuditId, DerivedResult, NdtTest, Severity, TestToggle, UnknownTest};
pub use evaluators::{all_evaluators, evaluate, evaluator_for, Evaluator, Tier};
pub use form::{FormError, NdtFormState, TestEntry};
pub use import::{FieldLogImportError, FieldLogImporter};
pub use measurement::{parse_measurement, MeasurementValue, Measurements};
pub use report::{NdtReport, QuantityEntry, ReportSection};
pub use repository::{PersistedSubmission, RepositoryError, SubmissionRepository};
pub use router::ndt_router;
pub use service::{FormServiceError, NdtFormService};
pub use submission::{
    build_submission, decode_persisted_result, restore_form, FormField, PhotoAttachment,
    SubmissionError, SubmissionLimits, SubmissionPayload, SubmissionReceipt, SubmissionStatus,
};
