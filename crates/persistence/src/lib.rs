//! Persistence layer for the helpdesk backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the legacy-schema adapter

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
