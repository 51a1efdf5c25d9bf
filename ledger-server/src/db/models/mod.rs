//! Database models
//!
//! Persisted record shapes. Records carry `id: Option<RecordId>` (absent
//! until created); the API layer converts them into the flat string-id
//! views from `shared::models`.

pub mod audit_log;
pub mod notification;
pub mod product;
pub mod restock_event;
pub mod sale;
pub mod user_profile;

pub use audit_log::AuditLogEntry;
pub use notification::Notification;
pub use product::{Product, ProductCreate};
pub use restock_event::{RestockEvent, RestockSource};
pub use sale::Sale;
pub use user_profile::{UserProfile, UserStats};
