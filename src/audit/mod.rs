//! Alert generation and bounded audit logging
//!
//! Every unsafe verdict or injection finding produced by the engine turns
//! into a structured [`Alert`], which is emitted as a single-line notice,
//! appended to a bounded in-memory [`AuditLog`], and summarized on demand
//! for human escalation.

pub mod alert;
pub mod log;

pub use alert::{format_human, raise, Alert, AlertLevel};
pub use log::{any_blocking, summarize, AlertSummary, AuditLog, AUDIT_LOG_CAPACITY};
