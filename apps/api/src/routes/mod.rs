pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analysis))
        .route("/api/v1/analysis/export", post(handlers::handle_export))
        .route("/api/v1/keywords", post(handlers::handle_keywords))
        // Capability tools
        .route("/api/v1/tools", get(handlers::handle_list_tools))
        .route("/api/v1/tools/:name", post(handlers::handle_invoke_tool))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(AppState::new(Arc::new(ScriptedModel::new(vec![]))))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "seo-maestro-api");
    }

    #[tokio::test]
    async fn test_analysis_route_accepts_camel_case_body() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/analysis")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"topic":"ab","country":"México","targetAudience":"pymes"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_tool_route_is_404() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/tools/backlinks")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
