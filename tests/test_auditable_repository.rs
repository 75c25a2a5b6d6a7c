//! Soft-delete / audit decorator behaviour over the in-memory store.

use chrono::{DateTime, Utc};
use guest_management::domain::audit::{audit_now, AuditableRepository};
use guest_management::domain::category::{CategorySource, EventCategory};
use guest_management::domain::repository::{
    Filter, ListOptions, Pagination, RepoError, Repository, Sort,
};
use guest_management::storage::MemoryRepository;
use std::time::Duration;
use uuid::Uuid;

type Store = MemoryRepository<EventCategory>;

fn setup() -> (Store, AuditableRepository<Store, EventCategory, Uuid>) {
    let store = Store::new();
    let repo = AuditableRepository::new(store.clone());
    (store, repo)
}

fn category(name: &str) -> EventCategory {
    EventCategory::new(CategorySource::App, None, name)
}

#[tokio::test]
async fn create_stamps_equal_nonzero_timestamps() {
    let (_, repo) = setup();
    let mut c = category("Wedding");
    let bogus: DateTime<Utc> = "2001-01-01T00:00:00Z".parse().unwrap();
    c.created_at = bogus;
    c.updated_at = bogus;

    repo.create(&mut c).await.unwrap();

    assert_eq!(c.created_at, c.updated_at);
    assert_ne!(c.created_at, bogus);
    assert_ne!(c.created_at, DateTime::<Utc>::default());
    assert!(c.deleted_at.is_none());

    let stored = repo.get_by_id(&c.id).await.unwrap();
    assert_eq!(stored, c);
}

#[tokio::test]
async fn update_advances_updated_at_and_keeps_created_at() {
    let (_, repo) = setup();
    let mut c = category("Birthday");
    repo.create(&mut c).await.unwrap();
    let created = c.created_at;

    tokio::time::sleep(Duration::from_millis(5)).await;
    c.name = "Birthday party".to_string();
    repo.update(&c.id.clone(), &mut c).await.unwrap();

    let stored = repo.get_by_id(&c.id).await.unwrap();
    assert_eq!(stored.created_at, created);
    assert!(stored.updated_at > created);
    assert_eq!(stored.name, "Birthday party");
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let (_, repo) = setup();
    let mut c = category("Conference");
    repo.create(&mut c).await.unwrap();

    repo.delete(&c.id).await.unwrap();
    let err = repo.delete(&c.id).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let (_, repo) = setup();
    let err = repo.delete(&Uuid::now_v7()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn soft_deleted_row_is_hidden_but_physically_kept() {
    let (store, repo) = setup();
    let mut keep = category("Keep");
    let mut gone = category("Gone");
    repo.create(&mut keep).await.unwrap();
    repo.create(&mut gone).await.unwrap();

    repo.delete(&gone.id).await.unwrap();

    assert!(matches!(repo.get_by_id(&gone.id).await, Err(RepoError::NotFound)));
    assert!(!repo.exists(&gone.id).await.unwrap());
    assert!(repo.exists(&keep.id).await.unwrap());

    let (items, total) = repo.list(&ListOptions::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![keep.id]);
    assert_eq!(repo.count(&Filter::new()).await.unwrap(), 1);

    // The physical layer still has the row, with the tombstone stamped.
    let raw = store.get_by_id(&gone.id).await.unwrap();
    let deleted_at = raw.deleted_at.expect("deleted_at stamped");
    assert_eq!(raw.updated_at, deleted_at);
    assert_eq!(store.len().await, 2);
    assert_eq!(repo.inner().count(&Filter::new()).await.unwrap(), 2);
}

#[tokio::test]
async fn update_of_soft_deleted_row_is_not_found() {
    let (store, repo) = setup();
    let mut c = category("Gala");
    repo.create(&mut c).await.unwrap();

    // A copy taken before the delete still carries deleted_at = None.
    let mut stale = c.clone();
    repo.delete(&c.id).await.unwrap();
    let tombstone = store.get_by_id(&c.id).await.unwrap();

    stale.name = "Gala revived".to_string();
    let err = repo.update(&c.id, &mut stale).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));

    let raw = repo.inner().get_by_id(&c.id).await.unwrap();
    assert!(raw.deleted_at.is_some());
    assert_eq!(raw, tombstone);
    assert!(matches!(repo.get_by_id(&c.id).await, Err(RepoError::NotFound)));
    assert_eq!(repo.count(&Filter::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let (_, repo) = setup();
    let mut c = category("Never stored");
    let err = repo.update(&c.id.clone(), &mut c).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_merges_with_caller_filter() {
    let (_, repo) = setup();
    let tenant = Uuid::now_v7();
    let mut a = EventCategory::new(CategorySource::Tenant, Some(tenant), "A");
    let mut b = EventCategory::new(CategorySource::Tenant, Some(tenant), "B");
    let mut other = category("Other");
    for c in [&mut a, &mut b, &mut other] {
        repo.create(c).await.unwrap();
    }
    repo.delete(&b.id).await.unwrap();

    let filter = Filter::new().eq("source", "tenant");
    let (items, total) = repo
        .list(&ListOptions::default().with_filter(filter.clone()))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, a.id);
    assert_eq!(repo.count(&filter).await.unwrap(), 1);
}

#[tokio::test]
async fn explicit_deleted_filter_yields_nothing() {
    let (_, repo) = setup();
    let mut c = category("Retired");
    repo.create(&mut c).await.unwrap();
    repo.delete(&c.id).await.unwrap();

    let opts = ListOptions::default().with_filter(Filter::new().is_not_null("deleted_at"));
    let (items, total) = repo.list(&opts).await.unwrap();
    assert!(items.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn list_breaks_ties_by_id_and_paginates_stably() {
    let (_, repo) = setup();
    let mut ids = Vec::new();
    for _ in 0..6 {
        let mut c = category("Same");
        repo.create(&mut c).await.unwrap();
        ids.push(c.id);
    }
    ids.sort();

    let mut seen = Vec::new();
    for page in 1..=3 {
        let opts = ListOptions::default()
            .with_sort(Sort::asc("name"))
            .with_pagination(Pagination::from_page(page, 2));
        let (items, total) = repo.list(&opts).await.unwrap();
        assert_eq!(total, 6);
        seen.extend(items.into_iter().map(|c| c.id));
    }
    assert_eq!(seen, ids);
}

#[tokio::test]
async fn skip_count_returns_zero_total() {
    let (_, repo) = setup();
    let mut c = category("Counted");
    repo.create(&mut c).await.unwrap();

    let (items, total) = repo.list(&ListOptions::default().skip_count()).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(total, 0);
}

#[tokio::test]
async fn create_conflict_propagates() {
    let (_, repo) = setup();
    let mut c = category("Twice");
    repo.create(&mut c).await.unwrap();
    let mut dup = c.clone();
    let err = repo.create(&mut dup).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

fn fixed_clock() -> DateTime<Utc> {
    "2030-06-01T08:00:00Z".parse().unwrap()
}

#[tokio::test]
async fn clock_is_injectable() {
    let repo = AuditableRepository::with_clock(Store::new(), fixed_clock);
    let mut c = category("Clocked");
    repo.create(&mut c).await.unwrap();
    assert_eq!(c.created_at, fixed_clock());

    repo.delete(&c.id).await.unwrap();
    let raw = repo.inner().get_by_id(&c.id).await.unwrap();
    assert_eq!(raw.deleted_at, Some(fixed_clock()));
    assert!(audit_now() < fixed_clock());
}
