//! Domain layer for the Urban System backend.
//!
//! This crate contains:
//! - Domain models (view models, request payloads, status enums)
//! - Pure business rules (city grouping, rating scores, attendance windows)

pub mod models;
pub mod services;
