// src/server/api.rs

//! The HTTP mapping of the directory operations.
//!
//! Every route accepts any method and checks it in the handler, so a method
//! outside the allowed set gets the same JSON error shape as every other
//! failure.

use crate::core::directory::{AgentSelf, Directory, JoinResult, Node};
use crate::core::errors::ConvoyError;
use crate::core::metrics::{
    DIRECTORY_ERRORS_TOTAL, DIRECTORY_REQUEST_LATENCY_SECONDS, DIRECTORY_REQUESTS_TOTAL,
};
use crate::core::role::NodeRole;
use axum::extract::{RawQuery, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Builds the agent API router.
pub fn router(directory: Arc<Directory>) -> Router {
    Router::new()
        .route("/v1/agent/self", any(agent_self))
        .route("/v1/agent/join", any(agent_join))
        .route("/v1/agent/members", any(agent_members))
        .route("/v1/agent/force-leave", any(agent_force_leave))
        .route("/v1/agent/servers", any(agent_servers))
        .with_state(directory)
}

/// A `ConvoyError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ConvoyError);

impl From<ConvoyError> for ApiError {
    fn from(e: ConvoyError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "kind": self.0.kind(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Counts, times and records one request, and tags failures by kind.
async fn observe<T, F>(directory: &Directory, operation: &'static str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ConvoyError>>,
{
    let start = Instant::now();
    DIRECTORY_REQUESTS_TOTAL
        .with_label_values(&[operation])
        .inc();

    let result = fut.await;

    let elapsed = start.elapsed();
    DIRECTORY_REQUEST_LATENCY_SECONDS.observe(elapsed.as_secs_f64());
    directory.stats().record_request(operation, elapsed);

    result.map_err(|e| {
        debug!("Request {} failed: {}", operation, e);
        DIRECTORY_ERRORS_TOTAL.with_label_values(&[e.kind()]).inc();
        ApiError(e)
    })
}

fn require_method(method: &Method, allowed: &[Method]) -> Result<(), ConvoyError> {
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(ConvoyError::MethodNotAllowed(method.to_string()))
    }
}

/// Every value of a (possibly repeated) query parameter, in order.
pub fn query_values(query: Option<&str>, key: &str) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

pub async fn agent_self(
    State(directory): State<Arc<Directory>>,
    method: Method,
) -> Result<Json<AgentSelf>, ApiError> {
    observe(&directory, "self", async {
        require_method(&method, &[Method::GET])?;
        Ok::<_, ConvoyError>(Json(directory.self_descriptor()))
    })
    .await
}

pub async fn agent_join(
    State(directory): State<Arc<Directory>>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Result<Json<JoinResult>, ApiError> {
    observe(&directory, "join", async {
        require_method(&method, &[Method::PUT, Method::POST])?;
        let addresses = query_values(query.as_deref(), "address");
        Ok::<_, ConvoyError>(Json(directory.join(&addresses).await?))
    })
    .await
}

pub async fn agent_members(
    State(directory): State<Arc<Directory>>,
    method: Method,
) -> Result<Json<Vec<Node>>, ApiError> {
    observe(&directory, "members", async {
        require_method(&method, &[Method::GET])?;
        Ok::<_, ConvoyError>(Json(directory.members().await?))
    })
    .await
}

pub async fn agent_force_leave(
    State(directory): State<Arc<Directory>>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Result<StatusCode, ApiError> {
    observe(&directory, "force_leave", async {
        require_method(&method, &[Method::PUT, Method::POST])?;
        let node = query_values(query.as_deref(), "node")
            .into_iter()
            .next()
            .unwrap_or_default();
        directory.force_leave(&node).await?;
        Ok::<_, ConvoyError>(StatusCode::OK)
    })
    .await
}

/// `GET` lists the reconciled servers; `PUT`/`POST` registers fallback servers.
pub async fn agent_servers(
    State(directory): State<Arc<Directory>>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    match method {
        Method::GET => {
            observe(&directory, "list_servers", async {
                // The reconciler answers an empty list here; the API treats it as unsupported.
                if directory.role() == NodeRole::None {
                    return Err(ConvoyError::RoleUnavailable {
                        operation: "list_servers",
                        required: NodeRole::Client,
                        actual: NodeRole::None,
                    });
                }
                Ok::<_, ConvoyError>(Json(directory.list_servers().await?).into_response())
            })
            .await
        }
        Method::PUT | Method::POST => {
            observe(&directory, "register_servers", async {
                let addresses = query_values(query.as_deref(), "address");
                directory.register_servers(&addresses)?;
                Ok::<_, ConvoyError>(StatusCode::OK.into_response())
            })
            .await
        }
        other => {
            observe(&directory, "servers", async {
                Err::<Response, _>(ConvoyError::MethodNotAllowed(other.to_string()))
            })
            .await
        }
    }
}
