//! Soft-delete / audit decorator over any [`Repository`].

use crate::domain::audit::fields::{is_soft_deleted, set_time_field, AuditField, Auditable};
use crate::domain::repository::{Filter, ListOptions, RepoError, RepoResult, Repository};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::marker::PhantomData;

/// Current time truncated to microseconds, the resolution Postgres stores.
pub fn audit_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Wraps a repository and adds lifecycle timestamps and soft-delete semantics.
///
/// - `create` stamps `created_at` and `updated_at` (caller values are overwritten).
/// - `update` is `NotFound` for a soft-deleted row; otherwise it stamps
///   `updated_at` and a caller-supplied `deleted_at` passes through.
/// - `delete` sets `deleted_at` and `updated_at` and persists through the inner
///   `update`; the row is never physically removed. Deleting twice is `NotFound`.
/// - `get_by_id` / `exists` treat soft-deleted rows as absent.
/// - `list` / `count` AND a `deleted_at IS NULL` condition into the caller's filter.
///
/// A caller filter asking for `deleted_at IS NOT NULL` therefore always yields
/// an empty result through this decorator.
pub struct AuditableRepository<R, E, I> {
    inner: R,
    clock: fn() -> DateTime<Utc>,
    _marker: PhantomData<fn() -> (E, I)>,
}

impl<R, E, I> AuditableRepository<R, E, I> {
    pub fn new(inner: R) -> Self {
        Self::with_clock(inner, audit_now)
    }

    pub fn with_clock(inner: R, clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            inner,
            clock,
            _marker: PhantomData,
        }
    }

    /// The wrapped repository; reads through it see soft-deleted rows.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn exclude_soft_deleted(filter: &Filter) -> Filter {
    filter.clone().is_null(AuditField::DeletedAt.column())
}

#[async_trait]
impl<R, E, I> Repository<E, I> for AuditableRepository<R, E, I>
where
    R: Repository<E, I>,
    E: Auditable + Send + Sync + 'static,
    I: Send + Sync + 'static,
{
    async fn create(&self, entity: &mut E) -> RepoResult<()> {
        let now = (self.clock)();
        set_time_field(entity, AuditField::CreatedAt, Some(now));
        set_time_field(entity, AuditField::UpdatedAt, Some(now));
        self.inner.create(entity).await
    }

    async fn get_by_id(&self, id: &I) -> RepoResult<E> {
        let entity = self.inner.get_by_id(id).await?;
        if is_soft_deleted(&entity) {
            return Err(RepoError::NotFound);
        }
        Ok(entity)
    }

    async fn update(&self, id: &I, entity: &mut E) -> RepoResult<()> {
        let stored = self.inner.get_by_id(id).await?;
        if is_soft_deleted(&stored) {
            return Err(RepoError::NotFound);
        }
        set_time_field(entity, AuditField::UpdatedAt, Some((self.clock)()));
        self.inner.update(id, entity).await
    }

    async fn delete(&self, id: &I) -> RepoResult<()> {
        let mut entity = self.inner.get_by_id(id).await?;
        if is_soft_deleted(&entity) {
            return Err(RepoError::NotFound);
        }
        let now = (self.clock)();
        set_time_field(&mut entity, AuditField::DeletedAt, Some(now));
        set_time_field(&mut entity, AuditField::UpdatedAt, Some(now));
        self.inner.update(id, &mut entity).await?;
        tracing::debug!(deleted_at = %now, "soft-deleted entity");
        Ok(())
    }

    async fn list(&self, opts: &ListOptions) -> RepoResult<(Vec<E>, i64)> {
        let merged = ListOptions {
            filter: exclude_soft_deleted(&opts.filter),
            sorts: opts.sorts.clone(),
            pagination: opts.pagination,
            skip_count: opts.skip_count,
        };
        self.inner.list(&merged).await
    }

    async fn count(&self, filter: &Filter) -> RepoResult<i64> {
        self.inner.count(&exclude_soft_deleted(filter)).await
    }

    async fn exists(&self, id: &I) -> RepoResult<bool> {
        match self.get_by_id(id).await {
            Ok(_) => Ok(true),
            Err(RepoError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
