//! Postgres wiring for `event_categories`.

use crate::domain::category::{
    CategorySource, EventCategory, EVENT_CATEGORIES_TABLE, EVENT_CATEGORY_COLUMNS,
};
use crate::domain::entity::FieldValue;
use crate::storage::postgres::{InsertBuilder, PgRepository, UpdateBuilder};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub fn scan_event_category(row: &PgRow) -> Result<EventCategory, sqlx::Error> {
    let source: String = row.try_get("source")?;
    let source = source
        .parse::<CategorySource>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "source".to_string(),
            source: Box::new(e),
        })?;
    Ok(EventCategory {
        id: row.try_get("id")?,
        source,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

pub struct EventCategoryInsertBuilder;

impl InsertBuilder<EventCategory> for EventCategoryInsertBuilder {
    fn build_query(&self, table: &str) -> String {
        format!(
            "INSERT INTO {} (id, source, tenant_id, name, created_at, updated_at) \
             VALUES ($1, $2, $3::uuid, $4, $5, $6)",
            table
        )
    }

    fn extract_values(&self, c: &EventCategory) -> Vec<FieldValue> {
        vec![
            c.id.into(),
            c.source.as_str().into(),
            c.tenant_id.into(),
            c.name.clone().into(),
            c.created_at.into(),
            c.updated_at.into(),
        ]
    }
}

pub struct EventCategoryUpdateBuilder;

impl UpdateBuilder<EventCategory> for EventCategoryUpdateBuilder {
    fn build_assignments(&self, _table: &str) -> Vec<String> {
        [
            "source = $1",
            "tenant_id = $2::uuid",
            "name = $3",
            "updated_at = $4",
            "deleted_at = $5::timestamptz",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn extract_values(&self, c: &EventCategory) -> Vec<FieldValue> {
        vec![
            c.source.as_str().into(),
            c.tenant_id.into(),
            c.name.clone().into(),
            c.updated_at.into(),
            c.deleted_at.into(),
        ]
    }
}

/// Physical repository for event categories (no soft-delete handling).
pub fn event_category_repository(pool: PgPool) -> PgRepository<EventCategory, Uuid> {
    PgRepository::new(
        pool,
        EVENT_CATEGORIES_TABLE,
        EVENT_CATEGORY_COLUMNS,
        scan_event_category,
        EventCategoryInsertBuilder,
        EventCategoryUpdateBuilder,
    )
    .with_column_type("id", "uuid")
    .with_column_type("tenant_id", "uuid")
}

/// Creates the table and its indexes if they are missing.
pub async fn ensure_event_category_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS event_categories (
            id UUID PRIMARY KEY,
            source TEXT NOT NULL CHECK (source IN ('app', 'tenant')),
            tenant_id UUID NULL,
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ NULL
        )",
    )
    .execute(pool)
    .await?;

    // Names are unique per owner among active rows only, so a soft-deleted
    // name can be reused.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS event_categories_owner_name_active_idx
         ON event_categories (source, COALESCE(tenant_id, '00000000-0000-0000-0000-000000000000'::uuid), lower(name))
         WHERE deleted_at IS NULL",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS event_categories_tenant_idx
         ON event_categories (tenant_id) WHERE deleted_at IS NULL",
    )
    .execute(pool)
    .await?;

    Ok(())
}
