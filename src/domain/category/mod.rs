//! Event categories: the reference entity wired through the repository stack.

pub mod model;
pub mod service;

pub use model::{
    CategorySource, EventCategory, EVENT_CATEGORIES_TABLE, EVENT_CATEGORY_COLUMNS,
    EVENT_CATEGORY_LIST_CONFIG,
};
pub use service::{CategoryService, CreateCategoryRequest, UpdateCategoryRequest};
