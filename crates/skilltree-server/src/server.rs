//! Axum web server with WebSocket streaming of engine commits.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skilltree_core::{
    Commit, Connection, DraftError, Edge, EdgeChange, GraphEvent, GraphSnapshot, HighlightView,
    Node, NodeChange, NodeDraft, NodeId, NodePatch, PersistedState, PointsView, Removal, SkillTree,
};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ApiError, Error, Result};

/// Commits buffered per receiver before it starts lagging.
const COMMIT_BUFFER: usize = 256;

/// Shared application state.
pub struct AppState {
    tree: RwLock<SkillTree>,
    commits: broadcast::Sender<Commit>,
}

impl AppState {
    /// Wrap an engine and forward its commits to the broadcast channel.
    pub fn new(mut tree: SkillTree) -> Arc<Self> {
        let (commits, _) = broadcast::channel(COMMIT_BUFFER);
        let sender = commits.clone();
        tree.subscribe(move |commit| {
            // No receivers is fine
            let _ = sender.send(commit.clone());
        });
        Arc::new(Self {
            tree: RwLock::new(tree),
            commits,
        })
    }

    /// Receive every commit published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Commit> {
        self.commits.subscribe()
    }

    /// The last published snapshot.
    pub async fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.tree.read().await.snapshot()
    }

    /// Durable form of the current state.
    pub async fn to_persisted(&self) -> PersistedState {
        self.tree.read().await.to_persisted()
    }
}

/// Skill tree editor server.
pub struct SkillTreeServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl SkillTreeServer {
    /// Load state from the configured file, or start empty if it is missing.
    pub fn load(config: ServerConfig) -> Result<Self> {
        let tree = match PersistedState::load(&config.state_path)? {
            Some(persisted) => SkillTree::from_persisted(persisted, config.engine()),
            None => {
                info!(path = %config.state_path.display(), "no saved state, starting empty");
                SkillTree::new(config.engine())
            }
        };
        Ok(Self {
            state: AppState::new(tree),
            config,
        })
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        router(self.state())
    }

    /// Serve until Ctrl-C, saving state after every commit and once more on
    /// shutdown.
    pub async fn serve(self) -> Result<()> {
        let persistence = spawn_persistence(self.state(), self.config.state_path.clone());

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("Skill tree server running on http://{}", self.config.addr);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        persistence.abort();
        persist_latest(&self.state, &self.config.state_path).await?;
        info!(path = %self.config.state_path.display(), "state saved, shutting down");
        Ok(())
    }
}

/// Build the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/search", get(search_handler))
        .route("/api/nodes", post(create_node_handler))
        .route("/api/nodes/delete", post(delete_nodes_handler))
        .route("/api/nodes/{id}", patch(edit_node_handler))
        .route("/api/nodes/{id}/unlock", get(unlock_guard_handler))
        .route("/api/connections", post(connect_handler))
        .route("/api/connections/validate", post(validate_connection_handler))
        .route("/api/changes/nodes", post(node_changes_handler))
        .route("/api/changes/edges", post(edge_changes_handler))
        .route("/api/points", post(points_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Save the current state to `path` on the blocking pool.
pub async fn persist_latest(state: &AppState, path: &FsPath) -> Result<()> {
    let persisted = state.to_persisted().await;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || persisted.save(&path))
        .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
    Ok(())
}

/// Save after every burst of commits.
pub fn spawn_persistence(state: Arc<AppState>, path: PathBuf) -> JoinHandle<()> {
    let mut commits = state.subscribe();
    tokio::spawn(async move {
        loop {
            match commits.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
            // Coalesce whatever queued up while we were saving
            loop {
                match commits.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }

            match persist_latest(&state, &path).await {
                Ok(()) => debug!(path = %path.display(), "state saved"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to save state"),
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<GraphSnapshot> {
    Json(GraphSnapshot::clone(&*state.snapshot().await))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<HighlightView> {
    let tree = state.tree.read().await;
    Json(tree.highlight(&query.q))
}

async fn create_node_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NodeDraft>,
) -> std::result::Result<(StatusCode, Json<Node>), ApiError> {
    let valid = draft.validate()?;
    let mut tree = state.tree.write().await;
    let id = tree.add_node(valid.label, valid.cost, valid.description);
    let node = tree
        .node(&id)
        .cloned()
        .ok_or_else(|| ApiError(skilltree_core::Error::NodeNotFound(id.clone())))?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn edit_node_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<NodePatch>,
) -> std::result::Result<Json<Node>, ApiError> {
    let patch = normalize_patch(patch)?;
    let id = NodeId::new(id);
    let mut tree = state.tree.write().await;
    tree.edit_node(&id, &patch)?;
    tree.node(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError(skilltree_core::Error::NodeNotFound(id.clone())))
}

/// Apply the editor's submit rules to the fields a patch carries.
fn normalize_patch(mut patch: NodePatch) -> std::result::Result<NodePatch, DraftError> {
    if let Some(label) = patch.label.as_mut() {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(DraftError::EmptyLabel);
        }
        *label = trimmed.to_string();
    }
    if patch.cost == Some(0) {
        return Err(DraftError::NonPositiveCost(0));
    }
    if let Some(description) = patch.description.as_mut() {
        *description = description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
    }
    Ok(patch)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GuardResponse {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

async fn unlock_guard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> std::result::Result<Json<GuardResponse>, ApiError> {
    let tree = state.tree.read().await;
    match tree.unlock_guard(&NodeId::new(id)) {
        Ok(()) => Ok(Json(GuardResponse {
            allowed: true,
            reason: None,
        })),
        Err(skilltree_core::Error::UnlockBlocked(blocked)) => Ok(Json(GuardResponse {
            allowed: false,
            reason: Some(blocked.to_string()),
        })),
        Err(e) => Err(e.into()),
    }
}

#[derive(Deserialize)]
struct DeleteRequest {
    ids: Vec<NodeId>,
}

async fn delete_nodes_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Json<Removal> {
    let mut tree = state.tree.write().await;
    Json(tree.remove_nodes(&req.ids))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_text: Option<String>,
}

async fn validate_connection_handler(
    State(state): State<Arc<AppState>>,
    Json(connection): Json<Connection>,
) -> Json<ValidationResponse> {
    let mut tree = state.tree.write().await;
    let valid = tree.is_valid_connection(&connection);
    Json(ValidationResponse {
        valid,
        error_text: tree.error_text().map(str::to_string),
    })
}

async fn connect_handler(
    State(state): State<Arc<AppState>>,
    Json(connection): Json<Connection>,
) -> std::result::Result<(StatusCode, Json<Edge>), ApiError> {
    let mut tree = state.tree.write().await;
    tree.connect(&connection)?;
    Ok((StatusCode::CREATED, Json(connection.to_edge())))
}

async fn node_changes_handler(
    State(state): State<Arc<AppState>>,
    Json(changes): Json<Vec<NodeChange>>,
) -> Json<GraphSnapshot> {
    let mut tree = state.tree.write().await;
    tree.apply_node_changes(&changes);
    Json(GraphSnapshot::clone(&tree.snapshot()))
}

async fn edge_changes_handler(
    State(state): State<Arc<AppState>>,
    Json(changes): Json<Vec<EdgeChange>>,
) -> Json<GraphSnapshot> {
    let mut tree = state.tree.write().await;
    tree.apply_edge_changes(&changes);
    Json(GraphSnapshot::clone(&tree.snapshot()))
}

#[derive(Deserialize)]
struct PointsRequest {
    delta: i64,
}

async fn points_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PointsRequest>,
) -> std::result::Result<Json<PointsView>, ApiError> {
    let mut tree = state.tree.write().await;
    tree.adjust_points(req.delta)?;
    Ok(Json(tree.points()))
}

// --- WebSocket ---

/// Frames pushed to WebSocket clients.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage<'a> {
    /// Full state, sent on connect and after the client fell behind
    Snapshot { snapshot: &'a GraphSnapshot },
    /// One committed transition
    Commit {
        revision: u64,
        event: &'a GraphEvent,
        snapshot: &'a GraphSnapshot,
    },
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");

    // Subscribe first so no commit slips between the snapshot and the stream
    let mut commits = state.subscribe();
    let snapshot = state.snapshot().await;
    if let Err(e) = send_message(&mut socket, &WsMessage::Snapshot { snapshot: &snapshot }).await {
        warn!("Failed to send initial snapshot: {}", e);
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            warn!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        debug!("Ignoring client message: {}", text.as_str());
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            commit = commits.recv() => {
                let sent = match commit {
                    Ok(commit) => {
                        let message = WsMessage::Commit {
                            revision: commit.revision,
                            event: &commit.event,
                            snapshot: &commit.snapshot,
                        };
                        send_message(&mut socket, &message).await
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "client lagged, resending snapshot");
                        let snapshot = state.snapshot().await;
                        send_message(&mut socket, &WsMessage::Snapshot { snapshot: &snapshot }).await
                    }
                    Err(RecvError::Closed) => break,
                };
                if let Err(e) = sent {
                    warn!("Failed to send update: {}", e);
                    break;
                }
            }
        }
    }
}

async fn send_message(socket: &mut WebSocket, message: &WsMessage<'_>) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize message: {}", e);
            Ok(())
        }
    }
}
