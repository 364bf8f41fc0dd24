//! Shared utilities and common types for the helpdesk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content digests (SHA-256) for attachment integrity
//! - Password hashing with Argon2id
//! - JWT session tokens
//! - Pagination limit clamping
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
