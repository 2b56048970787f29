use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use dice_core::dice::{Catalog, DiceError, DieType, InstanceOptions, PlacedGlyph};
use dice_core::font::{Font, FontKind, OutlineFileLoader, SegmentGlyphs};
use dice_core::kernel::{GeometryKernel, TriangleMesh, TruckKernel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

mod config;
mod store;

use config::BackendConfig;
use store::DieStore;

type Solid = <TruckKernel as GeometryKernel>::Solid;

/// Format an error as a JSON message for the frontend
fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!("ERROR_UPDATE:{}", json!({
        "code": code,
        "message": message,
        "severity": severity
    }))
}

// Application State
struct AppState {
    catalog: Catalog,
    kernel: TruckKernel,
    font: Font<TruckKernel>,
    dice: RwLock<DieStore<Solid>>,
}

/// Body of `POST /dice` and `GENERATE:`. The model defaults to the first
/// one that supports the requested die type.
#[derive(Debug, Deserialize)]
struct InstanceRequest {
    #[serde(default)]
    model: Option<String>,
    #[serde(flatten)]
    options: InstanceOptions,
}

#[derive(Debug, Serialize)]
struct InstanceResponse {
    id: Uuid,
    model: String,
    die_type: DieType,
    mapping: String,
    die_scale: f64,
    font_scale: f64,
    placements: Vec<PlacedGlyph>,
    mesh: TriangleMesh,
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    name: String,
    die_types: Vec<DieType>,
    mappings: Vec<String>,
    die_size: f64,
    font_size: f64,
    faces: usize,
    placements: usize,
}

#[derive(Debug)]
enum ApiError {
    UnknownModel(String),
    NoModelFor(DieType),
    UnknownDie(Uuid),
    Dice(DiceError),
    Internal(String),
}

impl From<DiceError> for ApiError {
    fn from(e: DiceError) -> Self {
        ApiError::Dice(e)
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownModel(_) | ApiError::NoModelFor(_) => "UNKNOWN_MODEL",
            ApiError::UnknownDie(_) => "UNKNOWN_DIE",
            ApiError::Dice(DiceError::Kernel(_)) => "KERNEL_FAILED",
            ApiError::Dice(_) => "INVALID_REQUEST",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownModel(_) | ApiError::NoModelFor(_) | ApiError::UnknownDie(_) => StatusCode::NOT_FOUND,
            ApiError::Dice(DiceError::Kernel(_)) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dice(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::UnknownModel(name) => format!("no model named '{}'", name),
            ApiError::NoModelFor(die_type) => format!("no model supports {}", die_type),
            ApiError::UnknownDie(id) => format!("no die with id {}", id),
            ApiError::Dice(e) => e.to_string(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "code": self.code(), "message": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = BackendConfig::from_env()?;
    let kernel = TruckKernel::with_tolerance(config.tolerance);
    let kind = FontKind::Spliced { padding: config.splice_padding };
    let font = match &config.font_file {
        Some(path) => Font::load(&OutlineFileLoader::from_path(path)?, &kernel, kind)?,
        None => Font::load(&SegmentGlyphs::default(), &kernel, kind)?,
    };
    info!("loaded font '{}' with {} glyphs", font.name(), font.len());

    let shared_state = Arc::new(AppState {
        catalog: Catalog::standard()?,
        kernel,
        font,
        dice: RwLock::new(DieStore::new(config.max_stored)),
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/models", get(list_models))
        .route("/dice", post(create_die))
        .route("/dice/:id", delete(delete_die))
        .route("/dice/:id/step", get(export_step))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    info!("listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Hello from Dice Backend!"
}

fn model_summaries(catalog: &Catalog) -> Vec<ModelSummary> {
    catalog
        .models()
        .map(|m| ModelSummary {
            name: m.name().to_string(),
            die_types: m.die_types().collect(),
            mappings: m.mapping_names().map(String::from).collect(),
            die_size: m.die_size(),
            font_size: m.font_size(),
            faces: m.polyhedron().faces().len(),
            placements: m.placement_count(),
        })
        .collect()
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<Vec<ModelSummary>> {
    Json(model_summaries(&state.catalog))
}

/// Builds, tessellates and stores one die. Blocking: truck booleans are CPU bound.
fn generate(state: &AppState, request: &InstanceRequest) -> Result<InstanceResponse, ApiError> {
    let model = match &request.model {
        Some(name) => state
            .catalog
            .get(name)
            .ok_or_else(|| ApiError::UnknownModel(name.clone()))?,
        None => state
            .catalog
            .find_by_type(request.options.die_type)
            .ok_or(ApiError::NoModelFor(request.options.die_type))?,
    };

    let instance = model.create_instance(&state.kernel, &state.font, &request.options)?;
    let mesh = state
        .kernel
        .tessellate(&instance.solid)
        .map_err(DiceError::from)?;

    let id = Uuid::new_v4();
    let (evicted, stored) = {
        let mut dice = state
            .dice
            .write()
            .map_err(|_| ApiError::Internal("die store is poisoned".into()))?;
        let evicted = dice.insert(id, instance.solid);
        (evicted, dice.len())
    };
    info!("generated {} ({}) as {}, {} stored", instance.model, instance.die_type, id, stored);
    for old in evicted {
        info!("evicted die {}", old);
    }

    Ok(InstanceResponse {
        id,
        model: instance.model,
        die_type: instance.die_type,
        mapping: instance.mapping,
        die_scale: instance.die_scale,
        font_scale: instance.font_scale,
        placements: instance.placements,
        mesh,
    })
}

async fn run_generate(state: Arc<AppState>, request: InstanceRequest) -> Result<InstanceResponse, ApiError> {
    tokio::task::spawn_blocking(move || generate(&state, &request))
        .await
        .map_err(|e| ApiError::Internal(format!("generation task failed: {}", e)))?
}

async fn create_die(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InstanceRequest>,
) -> Result<Json<InstanceResponse>, ApiError> {
    run_generate(state, request).await.map(Json)
}

async fn export_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let step = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let dice = state
            .dice
            .read()
            .map_err(|_| ApiError::Internal("die store is poisoned".into()))?;
        let solid = dice.get(&id).ok_or(ApiError::UnknownDie(id))?;
        Ok(state.kernel.export_step(solid).map_err(DiceError::from)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("export task failed: {}", e)))??;

    Ok(([(header::CONTENT_TYPE, "application/step")], step))
}

async fn delete_die(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state
        .dice
        .write()
        .map_err(|_| ApiError::Internal("die store is poisoned".into()))?
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::UnknownDie(id))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    let models = serde_json::to_string(&model_summaries(&state.catalog)).unwrap_or("[]".into());
    if socket.send(Message::Text(format!("MODELS_UPDATE:{}", models))).await.is_err() {
        return;
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        if let Message::Text(text) = msg {
            info!("Received message: {}", text);

            if text == "LIST_MODELS" {
                let models = serde_json::to_string(&model_summaries(&state.catalog)).unwrap_or("[]".into());
                if socket.send(Message::Text(format!("MODELS_UPDATE:{}", models))).await.is_err() {
                    return;
                }
            } else if let Some(json_str) = text.strip_prefix("GENERATE:") {
                let request = match serde_json::from_str::<InstanceRequest>(json_str) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!("Failed to parse GENERATE command: {}", e);
                        let error_msg = format_error("BAD_REQUEST", &format!("Invalid request: {}", e), "error");
                        if socket.send(Message::Text(error_msg)).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                let reply = match run_generate(state.clone(), request).await {
                    Ok(response) => {
                        info!("Sending DIE_UPDATE with {} triangles", response.mesh.triangle_count());
                        let json = serde_json::to_string(&response).unwrap_or("{}".into());
                        format!("DIE_UPDATE:{}", json)
                    }
                    Err(e) => {
                        warn!("Generation failed: {}", e.message());
                        format_error(e.code(), &e.message(), "error")
                    }
                };
                if socket.send(Message::Text(reply)).await.is_err() {
                    return;
                }
            } else {
                warn!("Unknown command: {}", text);
                let error_msg = format_error("UNKNOWN_COMMAND", &format!("Unknown command: {}", text), "warning");
                if socket.send(Message::Text(error_msg)).await.is_err() {
                    return;
                }
            }
        }
    }
}
