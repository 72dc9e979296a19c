//! Database layer - connection pool, unit of work and repositories
//!
//! # Design Principles
//!
//! - One pooled connection per unit of work, acquired lazily, released on drop
//! - One table per entity, rows created once and never updated
//! - Related rows are streamed in insertion order through keyset pages
//! - Rely on DB constraints (foreign keys ON), no check-then-insert

pub mod entity;
pub mod pool;
pub mod repos;
pub mod unit;

pub use entity::Entity;
pub use pool::{create_pool, create_pool_with_options, create_schema};
pub use repos::*;
pub use unit::UnitOfWork;
