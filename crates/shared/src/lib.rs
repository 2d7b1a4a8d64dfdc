//! Shared utilities and common types for the Urban System backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Page-number pagination (`PaginatedList`)
//! - Password hashing with Argon2id and password policy checks
//! - JWT issuing and validation
//! - Identifier parsing and coordinate validation

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
