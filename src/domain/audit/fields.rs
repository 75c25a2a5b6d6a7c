//! Access to the three audit timestamps of an entity.
//!
//! Entities opt in by implementing [`Auditable`], usually through
//! [`impl_auditable!`](crate::impl_auditable). A struct without the fields, or
//! with the wrong field types, fails to compile instead of being skipped at
//! runtime.

use chrono::{DateTime, Utc};
use std::fmt;

/// Logical audit columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditField {
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

impl AuditField {
    pub const ALL: [AuditField; 3] = [
        AuditField::CreatedAt,
        AuditField::UpdatedAt,
        AuditField::DeletedAt,
    ];

    pub fn column(self) -> &'static str {
        match self {
            AuditField::CreatedAt => "created_at",
            AuditField::UpdatedAt => "updated_at",
            AuditField::DeletedAt => "deleted_at",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name.trim())
    }
}

impl fmt::Display for AuditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` while the entity is active.
    pub deleted_at: Option<DateTime<Utc>>,
}

pub trait Auditable {
    fn audit_timestamps(&self) -> AuditTimestamps;
    fn set_audit_timestamps(&mut self, timestamps: AuditTimestamps);
}

pub fn get_time_field<E: Auditable + ?Sized>(entity: &E, field: AuditField) -> Option<DateTime<Utc>> {
    let ts = entity.audit_timestamps();
    match field {
        AuditField::CreatedAt => Some(ts.created_at),
        AuditField::UpdatedAt => Some(ts.updated_at),
        AuditField::DeletedAt => ts.deleted_at,
    }
}

/// Sets one audit field. `None` only applies to `deleted_at`; the two
/// mandatory timestamps are left untouched.
pub fn set_time_field<E: Auditable + ?Sized>(
    entity: &mut E,
    field: AuditField,
    value: Option<DateTime<Utc>>,
) {
    let mut ts = entity.audit_timestamps();
    match (field, value) {
        (AuditField::CreatedAt, Some(v)) => ts.created_at = v,
        (AuditField::UpdatedAt, Some(v)) => ts.updated_at = v,
        (AuditField::DeletedAt, v) => ts.deleted_at = v,
        (_, None) => return,
    }
    entity.set_audit_timestamps(ts);
}

pub fn is_soft_deleted<E: Auditable + ?Sized>(entity: &E) -> bool {
    entity.audit_timestamps().deleted_at.is_some()
}

/// Implements [`Auditable`] for a struct with `DateTime<Utc>` created/updated
/// fields and an `Option<DateTime<Utc>>` deleted field.
///
/// ```ignore
/// impl_auditable!(EventCategory);
/// impl_auditable!(Legacy { inserted, modified, removed });
/// ```
#[macro_export]
macro_rules! impl_auditable {
    ($ty:ty { $created:ident, $updated:ident, $deleted:ident }) => {
        impl $crate::domain::audit::Auditable for $ty {
            fn audit_timestamps(&self) -> $crate::domain::audit::AuditTimestamps {
                $crate::domain::audit::AuditTimestamps {
                    created_at: self.$created,
                    updated_at: self.$updated,
                    deleted_at: self.$deleted,
                }
            }

            fn set_audit_timestamps(&mut self, ts: $crate::domain::audit::AuditTimestamps) {
                self.$created = ts.created_at;
                self.$updated = ts.updated_at;
                self.$deleted = ts.deleted_at;
            }
        }
    };
    ($ty:ty) => {
        $crate::impl_auditable!($ty { created_at, updated_at, deleted_at });
    };
}
