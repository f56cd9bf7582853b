//! Request and Response models for the verification API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies, plus the
//! normalized provider records the services cache and return.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CheckNewsRequest, RefreshQuery};
pub use responses::{
    CacheCheck, CheckNewsResponse, ClaimReviewItem, ClassifierResult, HealthResponse, ReadyChecks,
    ReadyResponse, RedisCheck, SourceArticle, Verdict,
};
