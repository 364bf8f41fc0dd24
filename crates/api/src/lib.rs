//! Helpdesk HTTP API.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
