//! Audit trail
//!
//! # Architecture
//!
//! ```text
//! mutation (sale commit, restock, profile change)
//!   └─ AuditRecorder::record() → mpsc → AuditWorker → audit_log table
//! ```
//!
//! Recording is structurally fire-and-forget: `record()` only enqueues,
//! and both a full channel and a failed insert are logged and dropped.
//! No mutation can fail, slow down past the enqueue, or deadlock because
//! of its audit entry. The table is append-only — there is no update or
//! delete path anywhere in this module.

pub mod recorder;
pub mod storage;
pub mod worker;

pub use recorder::{AuditEvent, AuditRecorder};
pub use storage::AuditStorage;
pub use worker::AuditWorker;
