//! HTTP route handlers for plan and chat operations.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use orchestrator::core::types::{OrchestratorRun, PlanSession};
use orchestrator::error::OrchestratorError;
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{error, info};

use crate::state::{AppState, ChangeEvent};

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Deserialize)]
struct PlanRequest {
    goal: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
}

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(create_plan))
        .route("/plan/{session_id}", get(get_plan))
        .route("/chat", post(chat))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.service.session_count(),
    })
}

/// POST /plan - create a session and return its plan.
async fn create_plan(
    State(state): State<AppState>,
    request: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanSession>, ApiError> {
    let Json(request) = request.map_err(map_rejection)?;
    let service = Arc::clone(&state.service);
    let session = tokio::task::spawn_blocking(move || service.create_plan(&request.goal))
        .await
        .map_err(map_join_error)?
        .map_err(map_orchestrator_error)?;

    info!(session_id = %session.session_id, steps = session.plan.len(), "plan created");
    state.publish(ChangeEvent::PlanCreated {
        session_id: session.session_id.clone(),
    });
    Ok(Json(session))
}

/// GET /plan/{session_id} - the plan recorded at session creation.
async fn get_plan(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PlanSession>, ApiError> {
    state
        .service
        .get_plan(&session_id)
        .map(Json)
        .map_err(map_orchestrator_error)
}

/// POST /chat - run one turn of the agent pipeline.
async fn chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<OrchestratorRun>, ApiError> {
    let Json(request) = request.map_err(map_rejection)?;
    // Reject unknown ids before allocating a per-session lock.
    state
        .service
        .get_plan(&request.session_id)
        .map_err(map_orchestrator_error)?;

    let lock = state.turn_lock(&request.session_id);
    let _turn = lock.lock().await;

    let service = Arc::clone(&state.service);
    let ChatRequest {
        session_id,
        message,
    } = request;
    let run = tokio::task::spawn_blocking(move || service.handle_message(&session_id, &message))
        .await
        .map_err(map_join_error)?
        .map_err(map_orchestrator_error)?;

    state.publish(ChangeEvent::TurnCompleted {
        session_id: run.session_id.clone(),
    });
    Ok(Json(run))
}

fn map_orchestrator_error(err: OrchestratorError) -> ApiError {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        error!(error = %err, "orchestration failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}

/// Malformed or incomplete request bodies keep the `{"detail": ...}` shape.
fn map_rejection(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(ErrorBody {
            detail: rejection.body_text(),
        }),
    )
}

fn map_join_error(err: JoinError) -> ApiError {
    error!(error = %err, "orchestration task did not complete");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: "internal error".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use orchestrator::agents::AgentRegistry;
    use orchestrator::core::types::AgentResult;
    use orchestrator::io::config::OrchestratorConfig;
    use orchestrator::service::OrchestratorService;
    use orchestrator::test_support::StaticAgent;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn stub_state() -> AppState {
        let service =
            OrchestratorService::from_config(&OrchestratorConfig::default()).expect("service");
        AppState::new(service)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let app = api_router().with_state(state.clone());
        let resp = app.oneshot(req).await.expect("response");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .expect("body");
        let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, parsed)
    }

    #[tokio::test]
    async fn health_reports_session_count() {
        let state = stub_state();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");

        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "sessions": 0}));
    }

    #[tokio::test]
    async fn plan_then_chat_round_trip() {
        let state = stub_state();
        let mut events = state.event_tx.subscribe();

        let (status, plan) = send(&state, post_json("/plan", &json!({"goal": "Ship MVP"}))).await;
        assert_eq!(status, StatusCode::OK);
        let session_id = plan["session_id"].as_str().expect("session id").to_string();
        assert!(plan["plan"][0].as_str().expect("step").contains("Ship MVP"));
        assert_eq!(
            events.try_recv().expect("plan event"),
            ChangeEvent::PlanCreated {
                session_id: session_id.clone()
            }
        );

        let (status, run) = send(
            &state,
            post_json(
                "/chat",
                &json!({"session_id": session_id, "message": "Start execution"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["session_id"], json!(session_id));
        assert_eq!(run["history"][0], json!({"role": "user", "content": "Start execution"}));
        let agents: Vec<&str> = run["results"]
            .as_array()
            .expect("results")
            .iter()
            .filter_map(|r| r["agent"].as_str())
            .collect();
        assert_eq!(
            agents,
            vec!["navigator", "analyzer", "architect", "coder", "devops", "validator"]
        );
        assert!(matches!(
            events.try_recv().expect("turn event"),
            ChangeEvent::TurnCompleted { .. }
        ));

        let req = Request::builder()
            .uri(format!("/plan/{session_id}"))
            .body(Body::empty())
            .expect("request");
        let (status, fetched) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, plan);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let state = stub_state();

        let (status, body) = send(
            &state,
            post_json("/chat", &json!({"session_id": "nope", "message": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "unknown session_id: nope"}));

        let req = Request::builder()
            .uri("/plan/nope")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Misconfigured agent order surfaces as a server fault, not a client error.
    #[tokio::test]
    async fn unknown_agent_is_500() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(StaticAgent::new("planner", AgentResult::text("- step"))));
        let service = OrchestratorService::new(registry, "planner", vec!["ghost".to_string()]);
        let state = AppState::new(service);

        let (_, plan) = send(&state, post_json("/plan", &json!({"goal": "g"}))).await;
        let (status, body) = send(
            &state,
            post_json("/chat", &json!({"session_id": plan["session_id"], "message": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().expect("detail").contains("ghost"));
    }

    #[tokio::test]
    async fn missing_field_is_422_with_detail() {
        let state = stub_state();

        let (status, body) = send(&state, post_json("/plan", &json!({"objective": "x"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("goal"));

        let (status, body) = send(&state, post_json("/chat", &json!({"session_id": "s"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("message"));
        assert_eq!(state.service.session_count(), 0);
    }

    #[tokio::test]
    async fn unparseable_body_is_400_with_detail() {
        let state = stub_state();
        let req = Request::builder()
            .method("POST")
            .uri("/plan")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");

        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }
}
