//! Storage-agnostic repository contract.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod query;

pub use error::{RepoError, RepoResult};
pub use query::{
    Filter, FilterCondition, FilterOperator, ListOptions, Pagination, RawPredicate, Sort,
    SortDirection,
};

/// CRUD plus list/count/exists over entities of type `E` keyed by `I`.
///
/// Implementations are stateless delegations to a backing store: no retries,
/// no caching. Dropping a returned future cancels the underlying call.
///
/// `list` runs the page query and the count query as separate round-trips
/// with no shared snapshot, so the returned total may disagree with the
/// number of rows a concurrent writer leaves behind.
#[async_trait]
pub trait Repository<E, I>: Send + Sync
where
    E: Send + Sync + 'static,
    I: Send + Sync + 'static,
{
    /// Persists a new row. Storage-generated identifiers are written back into
    /// `entity`. Fails with [`RepoError::Conflict`] on a uniqueness violation.
    async fn create(&self, entity: &mut E) -> RepoResult<()>;

    async fn get_by_id(&self, id: &I) -> RepoResult<E>;

    /// Full-record replace keyed by `id`.
    async fn update(&self, id: &I, entity: &mut E) -> RepoResult<()>;

    async fn delete(&self, id: &I) -> RepoResult<()>;

    /// Returns the requested page ordered by `opts.sorts` with the identifier
    /// ascending as the final tie-break, and the total matching count (0 when
    /// `opts.skip_count` is set).
    async fn list(&self, opts: &ListOptions) -> RepoResult<(Vec<E>, i64)>;

    async fn count(&self, filter: &Filter) -> RepoResult<i64>;

    /// True iff `get_by_id` would succeed.
    async fn exists(&self, id: &I) -> RepoResult<bool>;
}

#[async_trait]
impl<E, I, R> Repository<E, I> for Arc<R>
where
    E: Send + Sync + 'static,
    I: Send + Sync + 'static,
    R: Repository<E, I> + ?Sized,
{
    async fn create(&self, entity: &mut E) -> RepoResult<()> {
        (**self).create(entity).await
    }

    async fn get_by_id(&self, id: &I) -> RepoResult<E> {
        (**self).get_by_id(id).await
    }

    async fn update(&self, id: &I, entity: &mut E) -> RepoResult<()> {
        (**self).update(id, entity).await
    }

    async fn delete(&self, id: &I) -> RepoResult<()> {
        (**self).delete(id).await
    }

    async fn list(&self, opts: &ListOptions) -> RepoResult<(Vec<E>, i64)> {
        (**self).list(opts).await
    }

    async fn count(&self, filter: &Filter) -> RepoResult<i64> {
        (**self).count(filter).await
    }

    async fn exists(&self, id: &I) -> RepoResult<bool> {
        (**self).exists(id).await
    }
}
