//! API Module
//!
//! HTTP handlers and routing for the verification service REST API.
//!
//! # Endpoints
//! - `POST /check-news` - Analyze a piece of news content
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe covering the cache backends

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
