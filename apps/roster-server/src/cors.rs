use std::time::Duration;

use anyhow::{Result, bail};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

/// Build the CORS layer from configuration.
///
/// Entries that do not parse as origins, methods or header names are skipped with a warning.
///
/// # Errors
/// Returns an error for `allowed_origins: ["*"]` combined with `allow_credentials: true`,
/// which browsers reject.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    let has_wildcard_origin = cfg.allowed_origins.iter().any(|o| o == "*");

    if has_wildcard_origin && cfg.allow_credentials {
        bail!(
            "CORS misconfiguration: allowed_origins=['*'] cannot be combined with \
             allow_credentials=true; list explicit origins instead"
        );
    }

    let mut layer = CorsLayer::new();

    if has_wildcard_origin {
        warn!("CORS allows any origin; list explicit origins for production deployments");
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = parse_all(&cfg.allowed_origins, "origin");
        if !origins.is_empty() {
            layer = layer.allow_origin(origins);
        }
    }

    if cfg.allowed_methods.iter().any(|m| m == "*") {
        layer = layer.allow_methods(Any);
    } else {
        let methods: Vec<Method> = parse_all(&cfg.allowed_methods, "method");
        if !methods.is_empty() {
            layer = layer.allow_methods(methods);
        }
    }

    if cfg.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = parse_all(&cfg.allowed_headers, "header");
        if !headers.is_empty() {
            layer = layer.allow_headers(headers);
        }
    }

    if cfg.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = cfg.max_age_seconds {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Ok(layer)
}

fn parse_all<T: std::str::FromStr>(values: &[String], kind: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| {
            let parsed = v.parse().ok();
            if parsed.is_none() {
                warn!(value = %v, kind, "Ignoring invalid CORS entry");
            }
            parsed
        })
        .collect()
}
