//! Axum web server with WebSocket streaming of session events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use cohort_proximity::Position;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::clock::format_ticks;
use crate::error::Error;
use crate::events::{SceneSnapshot, SessionEvent};
use crate::export::ExportFormat;
use crate::model::{Actor, ActorId, ActorPatch, HairStyle, Terrain, TerrainId, TerrainKind, TerrainSize};
use crate::session::SharedSession;
use crate::transactions::Groups;

/// HTTP front end for one session.
pub struct CohortServer {
    session: SharedSession,
}

impl CohortServer {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/actors", post(add_actor_handler))
            .route(
                "/api/actors/{id}",
                delete(remove_actor_handler).patch(update_actor_handler),
            )
            .route("/api/terrains", post(add_terrain_handler))
            .route(
                "/api/terrains/{id}",
                delete(remove_terrain_handler).patch(update_terrain_handler),
            )
            .route("/api/drag", post(drag_handler))
            .route("/api/release", post(release_handler))
            .route("/api/resize", post(resize_handler))
            .route("/api/pause", post(pause_handler))
            .route("/api/resume", post(resume_handler))
            .route("/api/reset", post(reset_handler))
            .route(
                "/api/export/{format}",
                get(export_handler).post(export_file_handler),
            )
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.session.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Cohort server running on http://localhost:{}", port);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Session errors as JSON responses.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::UnknownActor(_) | Error::UnknownTerrain(_) => StatusCode::NOT_FOUND,
            Error::InvalidCanvas { .. } | Error::UnknownExportFormat(_) | Error::Proximity(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Io(_) | Error::Serialization(_) | Error::Csv(_) | Error::Config(_) => {
                warn!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Server status response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub ticks: u64,
    pub clock: String,
    pub paused: bool,
    pub actor_count: usize,
    pub transaction_count: usize,
}

async fn status_handler(State(session): State<SharedSession>) -> Json<StatusResponse> {
    let session = session.read().await;
    Json(status_of(&session))
}

fn status_of(session: &crate::Session) -> StatusResponse {
    let model = session.model();
    StatusResponse {
        status: "ok".to_string(),
        ticks: model.ticks(),
        clock: format_ticks(model.ticks()),
        paused: session.is_paused(),
        actor_count: model.actor_count(),
        transaction_count: model.transactions().len(),
    }
}

async fn snapshot_handler(State(session): State<SharedSession>) -> Json<SceneSnapshot> {
    Json(session.read().await.snapshot())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddActorRequest {
    style: Option<HairStyle>,
}

async fn add_actor_handler(
    State(session): State<SharedSession>,
    Json(req): Json<AddActorRequest>,
) -> (StatusCode, Json<Actor>) {
    let actor = session.write().await.add_actor(req.style);
    (StatusCode::CREATED, Json(actor))
}

async fn remove_actor_handler(
    State(session): State<SharedSession>,
    Path(id): Path<ActorId>,
) -> ApiResult<StatusCode> {
    session.write().await.remove_actor(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_actor_handler(
    State(session): State<SharedSession>,
    Path(id): Path<ActorId>,
    Json(patch): Json<ActorPatch>,
) -> ApiResult<Json<Actor>> {
    Ok(Json(session.write().await.update_actor(&id, patch)?))
}

#[derive(Debug, Deserialize)]
struct AddTerrainRequest {
    kind: TerrainKind,
}

async fn add_terrain_handler(
    State(session): State<SharedSession>,
    Json(req): Json<AddTerrainRequest>,
) -> (StatusCode, Json<Terrain>) {
    let terrain = session.write().await.add_terrain(req.kind);
    (StatusCode::CREATED, Json(terrain))
}

async fn remove_terrain_handler(
    State(session): State<SharedSession>,
    Path(id): Path<TerrainId>,
) -> ApiResult<StatusCode> {
    session.write().await.remove_terrain(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Terrain edits; a move needs both coordinates.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TerrainEdit {
    x: Option<f64>,
    y: Option<f64>,
    size: Option<TerrainSize>,
}

async fn update_terrain_handler(
    State(session): State<SharedSession>,
    Path(id): Path<TerrainId>,
    Json(edit): Json<TerrainEdit>,
) -> ApiResult<Json<Terrain>> {
    let mut session = session.write().await;
    let mut terrain = None;
    if let (Some(x), Some(y)) = (edit.x, edit.y) {
        terrain = Some(session.move_terrain(&id, Position::new(x, y))?);
    }
    if let Some(size) = edit.size {
        terrain = Some(session.resize_terrain(&id, size)?);
    }
    match terrain {
        Some(terrain) => Ok(Json(terrain)),
        None => session
            .model()
            .terrains()
            .find(|t| t.id == id)
            .cloned()
            .map(Json)
            .ok_or(ApiError(Error::UnknownTerrain(id))),
    }
}

/// A pointer position for an actor, in canvas units.
#[derive(Debug, Clone, Copy, Deserialize)]
struct PointerRequest {
    actor: ActorId,
    x: f64,
    y: f64,
}

async fn drag_handler(
    State(session): State<SharedSession>,
    Json(req): Json<PointerRequest>,
) -> ApiResult<Json<Vec<SessionEvent>>> {
    let events = session
        .write()
        .await
        .drag(&req.actor, Position::new(req.x, req.y))?;
    Ok(Json(events))
}

/// Outcome of a released drag.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub changed: bool,
    pub groups: Groups,
    pub names: Vec<Vec<String>>,
}

async fn release_handler(
    State(session): State<SharedSession>,
    Json(req): Json<PointerRequest>,
) -> ApiResult<Json<ReleaseResponse>> {
    let mut session = session.write().await;
    let changed = session.release(&req.actor, Position::new(req.x, req.y))?;
    let model = session.model();
    let groups = model.last_groups();
    Ok(Json(ReleaseResponse {
        changed: changed.is_some(),
        names: model.group_names(&groups),
        groups,
    }))
}

#[derive(Debug, Deserialize)]
struct ResizeRequest {
    width: f64,
    height: f64,
}

async fn resize_handler(
    State(session): State<SharedSession>,
    Json(req): Json<ResizeRequest>,
) -> ApiResult<Json<SceneSnapshot>> {
    let mut session = session.write().await;
    session.resize(req.width, req.height)?;
    Ok(Json(session.snapshot()))
}

async fn pause_handler(State(session): State<SharedSession>) -> Json<StatusResponse> {
    let mut session = session.write().await;
    session.set_paused(true);
    Json(status_of(&session))
}

async fn resume_handler(State(session): State<SharedSession>) -> Json<StatusResponse> {
    let mut session = session.write().await;
    session.set_paused(false);
    Json(status_of(&session))
}

async fn reset_handler(State(session): State<SharedSession>) -> Json<SceneSnapshot> {
    let mut session = session.write().await;
    session.reset();
    Json(session.snapshot())
}

async fn export_handler(
    State(session): State<SharedSession>,
    Path(format): Path<String>,
) -> ApiResult<Response> {
    let format: ExportFormat = format.parse()?;
    let body = session.read().await.export(format)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        format.filename(chrono::Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportFileResponse {
    pub path: String,
}

async fn export_file_handler(
    State(session): State<SharedSession>,
    Path(format): Path<String>,
) -> ApiResult<(StatusCode, Json<ExportFileResponse>)> {
    let format: ExportFormat = format.parse()?;
    let path = session.read().await.export_to_dir(format)?;
    Ok((
        StatusCode::CREATED,
        Json(ExportFileResponse {
            path: path.display().to_string(),
        }),
    ))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(session): State<SharedSession>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, session))
}

async fn handle_ws(mut socket: WebSocket, session: SharedSession) {
    // Subscribe before the snapshot so nothing falls in between
    let (mut rx, snapshot) = {
        let session = session.read().await;
        (session.subscribe(), session.snapshot())
    };
    if send_json(&mut socket, &WsResponse::Snapshot(snapshot)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Ok(event) => {
                    if send_json(&mut socket, &event).await.is_err() {
                        debug!("WebSocket client disconnected (send failed)");
                        return;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let Ok(cmd) = serde_json::from_str::<WsCommand>(&text) else {
                        continue;
                    };
                    if let Some(response) = handle_ws_command(&session, cmd).await {
                        if send_json(&mut socket, &response).await.is_err() {
                            return;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                    debug!("WebSocket client disconnected");
                    return;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize WebSocket message: {e}");
            Ok(())
        }
    }
}

/// Commands a client can send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "get_snapshot")]
    GetSnapshot,
    #[serde(rename = "drag")]
    Drag { actor: ActorId, x: f64, y: f64 },
    #[serde(rename = "release")]
    Release { actor: ActorId, x: f64, y: f64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "snapshot")]
    Snapshot(SceneSnapshot),
    #[serde(rename = "error")]
    Error { message: String },
}

/// Drags and releases answer through the event stream; only failures reply.
async fn handle_ws_command(session: &SharedSession, cmd: WsCommand) -> Option<WsResponse> {
    let result = match cmd {
        WsCommand::GetSnapshot => {
            return Some(WsResponse::Snapshot(session.read().await.snapshot()));
        }
        WsCommand::Drag { actor, x, y } => session
            .write()
            .await
            .drag(&actor, Position::new(x, y))
            .map(|_| ()),
        WsCommand::Release { actor, x, y } => session
            .write()
            .await
            .release(&actor, Position::new(x, y))
            .map(|_| ()),
    };

    result.err().map(|e| WsResponse::Error {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::model::Model;
    use crate::session::Session;

    fn server() -> CohortServer {
        let session = Session::in_memory(SessionConfig::default(), Model::default()).unwrap();
        CohortServer::new(session.shared())
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }

    #[test]
    fn errors_map_to_status_codes() {
        let not_found = ApiError(Error::UnknownActor(ActorId::new())).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let bad = ApiError(Error::UnknownExportFormat("xml".into())).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let io = ApiError(Error::Io(std::io::Error::other("disk"))).into_response();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn ws_commands_report_only_failures() {
        let server = server();
        let actor = server.session.read().await.model().actors().next().unwrap().id;

        let ok = WsCommand::Drag { actor, x: 100.0, y: 100.0 };
        assert!(handle_ws_command(&server.session, ok).await.is_none());

        let bad = WsCommand::Release { actor: ActorId::new(), x: 0.0, y: 0.0 };
        assert!(matches!(
            handle_ws_command(&server.session, bad).await,
            Some(WsResponse::Error { .. })
        ));

        assert!(matches!(
            handle_ws_command(&server.session, WsCommand::GetSnapshot).await,
            Some(WsResponse::Snapshot(_))
        ));
    }
}
