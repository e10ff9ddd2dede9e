// Middleware for the job board API

pub mod auth_middleware;
pub mod cors;

pub use crate::models::AuthenticatedUser;
pub use auth_middleware::{auth_middleware, extract_bearer_token};
pub use cors::cors_layer;
