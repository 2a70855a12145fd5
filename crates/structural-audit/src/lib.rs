//! Structural audit record keeping: the non-destructive testing (NDT) evaluation engine, the
//! wizard form state it feeds, and the orchestrator that hands finished forms to persistence.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
