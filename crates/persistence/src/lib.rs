//! Persistence layer for the Urban System backend.
//!
//! This crate contains:
//! - Database connection management, migrations and seed data
//! - Entity definitions (database row mappings)
//! - A generic repository with a small filter language, usable over
//!   PostgreSQL or process-local tables
//! - The unit of work that scopes repositories and transactions

pub mod db;
pub mod entities;
pub mod entity;
pub mod error;
pub mod filter;
pub mod memory;
pub mod metrics;
pub mod repository;
pub mod seed;
pub mod unit_of_work;
pub mod value;

pub use entity::{Entity, EntityKey};
pub use error::RepositoryError;
pub use filter::{Filter, Order};
pub use repository::{Query, Repository};
pub use unit_of_work::UnitOfWork;
pub use value::Value;
