pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::{map_sqlx_error, InsertBuilder, PgRepository, ScanFn, UpdateBuilder};
