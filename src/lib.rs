pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::audit::{Auditable, AuditableRepository};
pub use domain::category::{CategoryService, EventCategory};
pub use domain::query::{parse_list_query, ListParams, ListQueryConfig, ListResult};
pub use domain::repository::{Filter, ListOptions, RepoError, RepoResult, Repository};
pub use storage::{MemoryRepository, PgRepository};
