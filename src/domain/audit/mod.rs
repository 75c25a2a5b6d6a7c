//! Audit timestamps and soft-delete support.

pub mod fields;
pub mod repository;

pub use fields::{
    get_time_field, is_soft_deleted, set_time_field, AuditField, AuditTimestamps, Auditable,
};
pub use repository::{audit_now, AuditableRepository};
