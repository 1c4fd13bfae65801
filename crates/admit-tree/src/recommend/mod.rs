//! Request-level recommendation flow and its HTTP surface.

pub mod router;
pub mod service;


pub use router::recommendation_router;
pub use service::{RecommendError, RecommendationService, HEALTH_KEY_LIMIT};
