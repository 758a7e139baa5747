//! HTTP front end for the single-shot path.

use super::single_shot::SingleShot;
use crate::config::Storage;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::{io, sync::Arc};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Embedded capture/upload page
const INDEX_HTML: &str = include_str!("index.html");

#[derive(Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// `GET /`, `POST /process_image` and the stored files under the mount.
pub fn create_router(single_shot: SingleShot, storage: &Storage, max_body_bytes: usize) -> Router {
    let files = ServeDir::new(&storage.root);
    let mount = storage.mount.trim_end_matches('/');

    let router = Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/process_image", post(process_image))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(Arc::new(single_shot));

    if mount.is_empty() {
        router.fallback_service(files)
    } else {
        router.nest_service(mount, files)
    }
}

async fn process_image(
    State(single_shot): State<Arc<SingleShot>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<serde_json::Map<String, serde_json::Value>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        log::warn!("rejected request body: {}", rejection.body_text());

        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        api_error(status, rejection.body_text())
    })?;

    let artifacts = tokio::task::spawn_blocking(move || single_shot.process(&request.image))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            if e.is_client_error() {
                log::warn!("{e}");
                api_error(StatusCode::BAD_REQUEST, e.to_string())
            } else {
                log::warn!("process image failed: {e}");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    Ok(Json(
        artifacts
            .into_iter()
            .map(|artifact| {
                (
                    artifact.kind.name().to_string(),
                    serde_json::Value::String(artifact.location),
                )
            })
            .collect(),
    ))
}

/// Serves `app` on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Binds `address` and serves until Ctrl-C.
pub async fn run_server(
    single_shot: SingleShot,
    storage: &Storage,
    max_body_bytes: usize,
    address: &str,
) -> io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    let app = create_router(single_shot, storage, max_body_bytes);

    serve(listener, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("listen for ctrl-c failed: {e}");
        }
        log::info!("server shutting down");
    })
    .await
}
