//! HTTP surface for triggered runs.
//!
//! `POST /run` executes one full pass synchronously and reports the outcome;
//! any request body is accepted and ignored, so generic schedulers and alert
//! webhooks can point at it without a payload contract. `GET /health` is a
//! liveness probe.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use http::StatusCode;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::{AppState, runner};

const RUN_COMPLETE_MESSAGE: &str =
    "Cluster check and termination process completed for all applications.";

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run", post(run))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn run(
    State(state): State<AppState>,
    _payload: Option<Json<Value>>,
) -> impl IntoResponse {
    match runner::run_all(
        &state.config,
        state.lister.as_ref(),
        state.terminator.as_ref(),
    )
    .await
    {
        Ok(pass) => (
            StatusCode::OK,
            Json(json!({
                "message": RUN_COMPLETE_MESSAGE,
                "dry_run": state.config.dry_run,
                "summary": pass,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Triggered run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use chrono::{TimeZone, Utc};
    use http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{LogFormat, ReaperConfig},
        provider::{GroupDescription, InMemoryProvider},
    };

    fn state(provider: InMemoryProvider, dry_run: bool) -> AppState {
        let provider = Arc::new(provider);
        AppState {
            config: Arc::new(ReaperConfig {
                region: "eu-west-1".to_string(),
                applications: vec!["alpha".to_string()],
                max_cluster_age_hours: 2,
                dry_run,
                interval_hours: None,
                log_format: LogFormat::Json,
            }),
            lister: provider.clone(),
            terminator: provider,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_app(state(InMemoryProvider::new(vec![]), true));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_run_without_body_returns_summary() {
        let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let provider = InMemoryProvider::single_page(vec![
            GroupDescription::new("alpha-api-x-v002", Utc::now()),
            GroupDescription::new("alpha-api-x-v001", old),
        ]);
        let app = build_app(state(provider, false));

        let response = app
            .oneshot(Request::post("/run").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], RUN_COMPLETE_MESSAGE);
        assert_eq!(body["dry_run"], json!(false));
        assert_eq!(body["summary"]["applications_processed"], json!(1));
        assert_eq!(body["summary"]["terminated"], json!(1));
    }

    #[tokio::test]
    async fn test_run_ignores_json_payload() {
        let app = build_app(state(InMemoryProvider::new(vec![]), true));

        let response = app
            .oneshot(
                Request::post("/run")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"source": "scheduler", "id": 42}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], RUN_COMPLETE_MESSAGE);
    }

    #[tokio::test]
    async fn test_run_discovery_failure_returns_500() {
        let provider = InMemoryProvider::single_page(vec![]).fail_listing_at(0);
        let app = build_app(state(provider, false));

        let response = app
            .oneshot(Request::post("/run").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("listing"));
    }

    #[tokio::test]
    async fn test_run_dry_run_reports_but_deletes_nothing() {
        let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let provider = InMemoryProvider::single_page(vec![
            GroupDescription::new("alpha-api-x-v002", Utc::now()),
            GroupDescription::new("alpha-api-x-v001", old),
        ]);
        let provider = Arc::new(provider);
        let app_state = AppState {
            config: Arc::new(ReaperConfig {
                region: "eu-west-1".to_string(),
                applications: vec!["alpha".to_string()],
                max_cluster_age_hours: 2,
                dry_run: true,
                interval_hours: None,
                log_format: LogFormat::Json,
            }),
            lister: provider.clone(),
            terminator: provider.clone(),
        };
        let app = build_app(app_state);

        let response = app
            .oneshot(Request::post("/run").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["terminated"], json!(1));
        assert!(provider.deleted().is_empty());
    }
}
