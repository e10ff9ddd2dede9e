use axum::http::{
    header::{self, HeaderValue},
    Method,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// CORS policy from `CORS_ALLOWED_ORIGINS`.
///
/// A `*` entry reflects the caller's origin outside production. In production only
/// the listed origins are allowed and `*` is ignored.
pub fn cors_layer(allowed_origins: &[String], is_production: bool) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .max_age(Duration::from_secs(3600));

    let has_wildcard = allowed_origins.iter().any(|o| o == "*");
    if has_wildcard && !is_production {
        debug!("CORS: reflecting request origin");
        return base.allow_origin(AllowOrigin::mirror_request());
    }
    if has_wildcard {
        warn!("CORS: wildcard origin ignored in production");
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "CORS: skipping malformed origin");
                None
            },
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}
