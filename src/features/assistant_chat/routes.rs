use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use super::handlers::{
    assistant_handler::create_assistant,
    chat_handler::{chat_stream, ChatState},
};
use super::services::{AssistantRuntimeService, AssistantService};

/// Create routes for the assistant chat feature
///
/// `body_limit` bounds the multipart chat body, which may carry a file.
pub fn routes(
    runtime_service: Arc<AssistantRuntimeService>,
    assistant_service: Arc<AssistantService>,
    body_limit: usize,
) -> Router {
    let chat_state = ChatState {
        runtime: runtime_service,
    };

    let chat_routes = Router::new()
        .route(
            "/api/assistant",
            post(chat_stream).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(chat_state);

    let assistant_routes = Router::new()
        .route("/api/assistant/create", post(create_assistant))
        .with_state(assistant_service);

    chat_routes.merge(assistant_routes)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::AssistantConfig;
    use crate::features::assistant_chat::services::{ConversationService, RunDriver};
    use crate::features::assistant_chat::tools::{
        create_tool_registry, RoomTemperatureStore, UnknownRoomPolicy,
    };
    use crate::shared::test_helpers::FakeAssistantApi;

    fn app(api: Arc<FakeAssistantApi>, body_limit: usize) -> Router {
        let config = AssistantConfig {
            api_key: "sk-test".to_string(),
            assistant_id: Some("asst_1".to_string()),
            base_url: "http://localhost".to_string(),
            request_timeout: std::time::Duration::from_secs(5),
            stream_idle_timeout: std::time::Duration::from_secs(5),
            default_model: "gpt-4o".to_string(),
            default_name: "Math Tutor".to_string(),
            default_instructions: "Be helpful".to_string(),
        };
        let registry =
            create_tool_registry(RoomTemperatureStore::with_defaults(UnknownRoomPolicy::Create));
        let runtime = AssistantRuntimeService::new(
            ConversationService::new(api.clone()),
            RunDriver::new(api.clone(), registry.clone(), config.assistant_id.clone()),
            config.stream_idle_timeout,
        );
        let assistants = AssistantService::new(api, registry, &config);

        routes(Arc::new(runtime), Arc::new(assistants), body_limit)
    }

    #[tokio::test]
    async fn test_oversized_chat_body_is_rejected() {
        let api = Arc::new(FakeAssistantApi::new());
        let filler = "a".repeat(4096);
        let body = format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{}\r\n--XBOUNDARY--\r\n",
            filler
        );

        let response = app(api.clone(), 1024)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/assistant")
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_route_only_accepts_post() {
        let api = Arc::new(FakeAssistantApi::new());

        let response = app(api, 1024)
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/assistant")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
