//! HTTP handlers: Prometheus exposition and health.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, error};

use procgauge_core::{Registry, RegistryError};

pub(crate) type AppState = State<Arc<Registry>>;

pub(crate) fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/metrics", get(handle_metrics))
        .route("/health", get(handle_health))
        .with_state(registry)
}

/// Error type for exposition failures.
#[derive(Debug)]
pub(crate) struct MetricsError(RegistryError);

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "failed to encode metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
    }
}

pub(crate) async fn handle_metrics(State(registry): AppState) -> Result<Response, MetricsError> {
    let body = registry.encode_text().map_err(MetricsError)?;
    debug!(bytes = body.len(), "scrape served");
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use procgauge_core::MetricFamily;
    use procgauge_core::collector::MockFs;
    use procgauge_core::sampler::Sampler;
    use tower::ServiceExt;

    async fn get_body(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_before_first_tick_are_zero() {
        let registry = Arc::new(Registry::new().unwrap());
        let (status, content_type, body) = get_body(router(registry), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(prometheus::TEXT_FORMAT));
        for family in MetricFamily::ALL {
            assert!(
                body.contains(&format!("\n{} 0\n", family.name())),
                "{family} missing from:\n{body}"
            );
        }
    }

    #[tokio::test]
    async fn metrics_reflect_sampled_values() {
        let registry = Arc::new(Registry::new().unwrap());
        let mut sampler = Sampler::new(MockFs::typical_system(), "/proc");
        sampler.tick(&registry);

        let (status, _, body) = get_body(router(registry), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# TYPE cpu_usage_percentage gauge"));
        assert!(body.contains("\nexecution_process_number 2\n"));
        assert!(body.contains("\ncontext_switches 500000\n"));
        assert!(body.contains("\nio_disk_usage_percentage 100\n"));
    }

    #[tokio::test]
    async fn concurrent_scrapes_while_sampling() {
        let registry = Arc::new(Registry::new().unwrap());
        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..2_000 {
                    registry.set(MetricFamily::ContextSwitches, (i % 2) as f64);
                }
            })
        };

        let scrapes: Vec<_> = (0..8)
            .map(|_| {
                let app = router(Arc::clone(&registry));
                tokio::spawn(async move { get_body(app, "/metrics").await })
            })
            .collect();

        for scrape in scrapes {
            let (status, _, body) = scrape.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            assert!(
                body.contains("\ncontext_switches 0\n") || body.contains("\ncontext_switches 1\n")
            );
        }
        writer.join().unwrap();
    }

    #[tokio::test]
    async fn health_is_ok() {
        let registry = Arc::new(Registry::new().unwrap());
        let (status, _, body) = get_body(router(registry), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let registry = Arc::new(Registry::new().unwrap());
        let (status, _, _) = get_body(router(registry), "/api/v1/snapshot").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
