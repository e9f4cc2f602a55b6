//! CORS policy
//!
//! Origins on the allow-list and any deployment-preview host ending in the
//! configured suffix are mirrored back with credentials allowed. An empty
//! allow-list admits every origin. Requests without an `Origin` header
//! (server-to-server) are never affected.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::config::HttpServerConfig;

/// Build the CORS layer from config
pub fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let allowed = config.cors_origins.clone();
    let preview_suffix = config.cors_preview_suffix.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| origin_allowed(o, &allowed, preview_suffix.as_deref()))
                    .unwrap_or(false)
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Whether a browser origin may call the API
pub fn origin_allowed(origin: &str, allowed: &[String], preview_suffix: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    if allowed.iter().any(|a| a.trim_end_matches('/') == origin) {
        return true;
    }

    match preview_suffix {
        Some(suffix) if !suffix.is_empty() => is_preview_host(origin, suffix),
        _ => false,
    }
}

fn is_preview_host(origin: &str, suffix: &str) -> bool {
    let Some(rest) = origin.strip_prefix("https://") else {
        return false;
    };
    let host = rest.split(':').next().unwrap_or(rest);
    let suffix = suffix.trim_start_matches('.');

    host.strip_suffix(suffix)
        .map(|label| label.len() > 1 && label.ends_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        vec![
            "https://cms.example.com".to_string(),
            "http://localhost:5173/".to_string(),
        ]
    }

    #[test]
    fn test_allow_list() {
        let allowed = allow_list();
        assert!(origin_allowed("https://cms.example.com", &allowed, None));
        assert!(origin_allowed("http://localhost:5173", &allowed, None));
        assert!(!origin_allowed("https://evil.example.com", &allowed, None));
    }

    #[test]
    fn test_preview_suffix() {
        let allowed = allow_list();
        let suffix = Some(".vercel.app");
        assert!(origin_allowed("https://cms-git-feature-team.vercel.app", &allowed, suffix));
        assert!(!origin_allowed("https://vercel.app", &allowed, suffix));
        assert!(!origin_allowed("https://evilvercel.app", &allowed, suffix));
        assert!(!origin_allowed("http://cms-preview.vercel.app", &allowed, suffix));
        assert!(!origin_allowed("https://cms.vercel.app.evil.com", &allowed, suffix));
    }

    #[test]
    fn test_empty_allow_list_is_open() {
        assert!(origin_allowed("https://anything.test", &[], None));
    }
}
