use crate::domain::entity::{FieldValue, Record};
use crate::domain::query::ListQueryConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub const EVENT_CATEGORIES_TABLE: &str = "event_categories";

/// Columns of `event_categories`, in select order.
pub const EVENT_CATEGORY_COLUMNS: &[&str] = &[
    "id",
    "source",
    "tenant_id",
    "name",
    "created_at",
    "updated_at",
    "deleted_at",
];

pub const EVENT_CATEGORY_LIST_CONFIG: ListQueryConfig = ListQueryConfig::new(
    &["id", "source", "tenant_id", "name", "created_at", "updated_at"],
    &["name", "source", "tenant_id"],
);

/// Who owns a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// System-defined; never carries a tenant.
    App,
    /// Tenant-defined; `tenant_id` is required.
    Tenant,
}

impl CategorySource {
    pub fn as_str(self) -> &'static str {
        match self {
            CategorySource::App => "app",
            CategorySource::Tenant => "tenant",
        }
    }
}

impl fmt::Display for CategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for CategorySource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(CategorySource::App),
            "tenant" => Ok(CategorySource::Tenant),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// A row in `event_categories`. Soft-deleted through `deleted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventCategory {
    pub id: Uuid,
    pub source: CategorySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

crate::impl_auditable!(EventCategory);

impl EventCategory {
    /// A fresh, not yet persisted category with a time-ordered id.
    pub fn new(source: CategorySource, tenant_id: Option<Uuid>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            source,
            tenant_id,
            name: name.into(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            deleted_at: None,
        }
    }
}

impl Record for EventCategory {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        let value: FieldValue = match column {
            "id" => self.id.into(),
            "source" => self.source.as_str().into(),
            "tenant_id" => self.tenant_id.into(),
            "name" => self.name.clone().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            "deleted_at" => self.deleted_at.into(),
            _ => return None,
        };
        Some(value)
    }
}
