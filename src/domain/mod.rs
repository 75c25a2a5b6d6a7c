pub mod audit;
pub mod category;
pub mod entity;
pub mod query;
pub mod repository;
