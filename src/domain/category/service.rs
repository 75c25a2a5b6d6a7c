use crate::domain::audit::AuditableRepository;
use crate::domain::category::model::{
    CategorySource, EventCategory, EVENT_CATEGORY_LIST_CONFIG,
};
use crate::domain::query::{parse_list_query, ListParams, ListResult};
use crate::domain::repository::{RepoError, RepoResult, Repository};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub source: CategorySource,
    /// Required when `source` is `tenant`, rejected when `app`.
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub name: String,
}

/// Partial update: only provided fields are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub source: Option<CategorySource>,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
}

fn validate(category: &EventCategory) -> RepoResult<()> {
    if category.name.is_empty() {
        return Err(RepoError::validation("name must not be empty"));
    }
    if category.name.chars().count() > MAX_NAME_LEN {
        return Err(RepoError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    match (category.source, category.tenant_id) {
        (CategorySource::Tenant, None) => Err(RepoError::validation(
            "tenant_id is required when source is tenant",
        )),
        (CategorySource::App, Some(_)) => Err(RepoError::validation(
            "tenant_id must be empty when source is app",
        )),
        _ => Ok(()),
    }
}

/// Event category use-cases over a soft-deleting repository.
pub struct CategoryService {
    repo: Arc<dyn Repository<EventCategory, Uuid>>,
}

impl CategoryService {
    /// Wraps `store` in the audit decorator; every read and write goes through it.
    pub fn new<R>(store: R) -> Self
    where
        R: Repository<EventCategory, Uuid> + 'static,
    {
        Self {
            repo: Arc::new(AuditableRepository::new(store)),
        }
    }

    /// Uses `repo` as-is. The caller is responsible for soft-delete handling.
    pub fn from_repository(repo: Arc<dyn Repository<EventCategory, Uuid>>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn Repository<EventCategory, Uuid>> {
        &self.repo
    }

    pub async fn create(&self, input: CreateCategoryRequest) -> RepoResult<EventCategory> {
        let mut category = EventCategory::new(input.source, input.tenant_id, input.name.trim());
        validate(&category)?;
        self.repo.create(&mut category).await?;
        tracing::info!(id = %category.id, source = %category.source, "created event category");
        Ok(category)
    }

    pub async fn get(&self, id: Uuid) -> RepoResult<EventCategory> {
        self.repo.get_by_id(&id).await
    }

    /// Switching `source` to `app` clears `tenant_id`.
    pub async fn update(&self, id: Uuid, input: UpdateCategoryRequest) -> RepoResult<EventCategory> {
        let mut category = self.repo.get_by_id(&id).await?;
        if let Some(source) = input.source {
            category.source = source;
            if source == CategorySource::App {
                category.tenant_id = None;
            }
        }
        if let Some(tenant_id) = input.tenant_id {
            category.tenant_id = Some(tenant_id);
        }
        if let Some(name) = input.name {
            category.name = name.trim().to_string();
        }
        validate(&category)?;
        self.repo.update(&id, &mut category).await?;
        tracing::info!(id = %id, "updated event category");
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.repo.delete(&id).await?;
        tracing::info!(id = %id, "deleted event category");
        Ok(())
    }

    pub async fn list(&self, params: &ListParams) -> RepoResult<ListResult<EventCategory>> {
        let (items, total) = self.repo.list(&params.to_list_options()).await?;
        tracing::debug!(
            page = params.page,
            size = params.size,
            returned = items.len(),
            total,
            "listed event categories"
        );
        Ok(ListResult::new(items, total, params.page, params.size))
    }

    /// Parses a raw list query and lists.
    pub async fn list_from_query(
        &self,
        query: &[(String, String)],
    ) -> RepoResult<ListResult<EventCategory>> {
        let params = parse_list_query(query, &EVENT_CATEGORY_LIST_CONFIG).map_err(|e| {
            tracing::warn!(error = %e, "rejected list query");
            RepoError::from(e)
        })?;
        self.list(&params).await
    }
}
