//! Newscheck - a news verification API with a tiered async response cache
//!
//! The cache layer memoizes async computations behind interchangeable
//! in-process (TTL/LRU) and redis-backed stores; the service layer uses
//! it to wrap three external providers feeding a blended verdict.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::AppState;
pub use config::Config;
