use std::{any::Any, net::SocketAddr, path::Path};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use kata_grader::{GradingEngine, TestRunResult};
use kata_project::project::EphemeralProject;
use serde_json::json;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    cors::{CorsPolicy, mw_cors},
    extract::JsonBody,
    models::{NO_CODE_PROVIDED, RunRequest, RunResponse, TestRequest},
    prelude::*,
};

/// State shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct ApiState {
    pub engine: GradingEngine,
}

impl ApiState {
    pub fn new(engine: GradingEngine) -> Self {
        Self { engine }
    }
}

pub fn router(state: ApiState, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/api/run", post(run_code).fallback(method_not_allowed))
        .route("/api/test", post(test_code).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(cors, mw_cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(state)
}

/// Bind the listener and serve the API in the background.
///
/// Returns the bound address, which differs from the configured one when
/// port `0` is requested.
pub async fn setup_api(config: &Config) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let app = router(
        ApiState::default(),
        CorsPolicy::new(config.allowed_origin.clone()),
    );

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    let addr = listener.local_addr()?;
    info!("Listening on {addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await?;
        Ok(())
    });

    Ok((addr, handle))
}

async fn run_code(
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<RunRequest>,
) -> (StatusCode, Json<RunResponse>) {
    if payload.code.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(RunResponse::no_code()));
    }

    let project = match EphemeralProject::create(&payload.code).await {
        Ok(project) => project,
        Err(err) => {
            error!("Failed to provision project - {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunResponse::execution_failed(err)),
            );
        }
    };

    let result = execute(&state, project.path(), &payload.args).await;
    project.cleanup().await;

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(err) => {
            error!("Failed to run submission - {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunResponse::execution_failed(err)),
            )
        }
    }
}

async fn execute(state: &ApiState, project: &Path, args: &[String]) -> Result<RunResponse> {
    let pipeline = state.engine.pipeline();
    let build = pipeline.build(project).await?;
    if !build.success {
        debug!("Build failed with {:?}", build.exit_code);
        return Ok(RunResponse::compilation_failed(build));
    }

    let run = pipeline.run_with_args(project, args).await?;
    Ok(RunResponse::executed(run))
}

async fn test_code(
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<TestRequest>,
) -> (StatusCode, Json<TestRunResult>) {
    if payload.code.trim().is_empty() {
        let result = TestRunResult::all_failed(&payload.tests, NO_CODE_PROVIDED)
            .with_compilation_error(Some(NO_CODE_PROVIDED.to_string()));
        return (StatusCode::BAD_REQUEST, Json(result));
    }

    let result = state.engine.grade(&payload.code, &payload.tests).await;
    let status = if result.execution_error.is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(result))
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

async fn not_found() -> Error {
    Error::NotFound
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked - {message}");

    let body = Json(json!({
        "success": false,
        "executionError": "Internal server error",
    }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
