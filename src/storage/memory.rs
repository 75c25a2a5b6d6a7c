//! In-process implementation of the repository contract.
//!
//! Rows live in a `BTreeMap` keyed by id, so iteration is already in id order
//! and the final tie-break comes for free. Filters and sorts read columns by
//! name through [`Record::field`].

use crate::domain::entity::Record;
use crate::domain::repository::{
    Filter, FilterCondition, FilterOperator, ListOptions, RepoError, RepoResult, Repository, Sort,
    SortDirection,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryRepository<E: Record> {
    rows: Arc<RwLock<BTreeMap<E::Id, E>>>,
}

impl<E: Record> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<E: Record> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of physical rows, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn condition_matches<E: Record>(entity: &E, condition: &FilterCondition) -> RepoResult<bool> {
    let value = entity.field(&condition.field).ok_or_else(|| {
        RepoError::validation(format!("unknown filter column: {}", condition.field))
    })?;
    Ok(match &condition.operator {
        FilterOperator::Eq(expected) => value.matches(expected),
        FilterOperator::IsNull => value.is_null(),
        FilterOperator::IsNotNull => !value.is_null(),
    })
}

fn filter_matches<E: Record>(entity: &E, filter: &Filter) -> RepoResult<bool> {
    if filter.raw.is_some() {
        return Err(RepoError::validation(
            "raw predicates are not supported by the in-memory store",
        ));
    }
    for condition in &filter.conditions {
        if !condition_matches(entity, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare_by<E: Record>(a: &E, b: &E, sorts: &[Sort]) -> Ordering {
    for sort in sorts {
        let (Some(left), Some(right)) = (a.field(&sort.field), b.field(&sort.field)) else {
            continue;
        };
        let ord = left.compare(&right);
        let ord = match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id().cmp(&b.id())
}

fn check_sort_columns<E: Record>(sample: Option<&E>, sorts: &[Sort]) -> RepoResult<()> {
    let Some(sample) = sample else {
        return Ok(());
    };
    for sort in sorts {
        if sample.field(&sort.field).is_none() {
            return Err(RepoError::validation(format!(
                "unknown sort column: {}",
                sort.field
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl<E: Record> Repository<E, E::Id> for MemoryRepository<E> {
    async fn create(&self, entity: &mut E) -> RepoResult<()> {
        let mut rows = self.rows.write().await;
        let id = entity.id();
        if rows.contains_key(&id) {
            return Err(RepoError::Conflict(format!("row with id {} already exists", id)));
        }
        rows.insert(id, entity.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &E::Id) -> RepoResult<E> {
        self.rows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: &E::Id, entity: &mut E) -> RepoResult<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(row) => {
                *row = entity.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: &E::Id) -> RepoResult<()> {
        self.rows
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn list(&self, opts: &ListOptions) -> RepoResult<(Vec<E>, i64)> {
        let rows = self.rows.read().await;
        check_sort_columns(rows.values().next(), &opts.sorts)?;

        let mut matching = Vec::new();
        for row in rows.values() {
            if filter_matches(row, &opts.filter)? {
                matching.push(row);
            }
        }
        matching.sort_by(|a, b| compare_by(*a, *b, &opts.sorts));

        let total = if opts.skip_count {
            0
        } else {
            matching.len() as i64
        };
        let (offset, limit) = match opts.pagination {
            Some(p) => (p.offset.max(0) as usize, p.limit.max(0) as usize),
            None => (0, matching.len()),
        };
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn count(&self, filter: &Filter) -> RepoResult<i64> {
        let rows = self.rows.read().await;
        let mut total = 0;
        for row in rows.values() {
            if filter_matches(row, filter)? {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn exists(&self, id: &E::Id) -> RepoResult<bool> {
        Ok(self.rows.read().await.contains_key(id))
    }
}
