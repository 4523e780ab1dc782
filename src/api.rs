//! REST API for the shelf planner.
//!
//! Provides HTTP endpoints for the embedded web UI and other clients.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, PlannerConfig};
use crate::metrics::{AllocationMetrics, ShelfMetrics, StackMetrics};
use crate::model::{BoardGame, HeightRule, ShelfBlueprint, ValidationError};
use crate::optimizer::{
    AllocationEvent, AllocationResult, OrderingStrategy, PlanningConfig, PlanningError,
    plan_with_config, plan_with_progress,
};
use crate::render::{SvgOptions, render_shelves};

#[derive(Clone)]
struct ApiState {
    planner_config: PlannerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>shelf-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// One game as sent by a client.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(example = json!({ "name": "Azul", "width": 10.25, "height": 3.0 }))]
pub struct GameRequest {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

/// Shelf set to plan against; the server default is used when omitted.
#[derive(Deserialize, Clone, Copy, ToSchema)]
#[schema(example = json!({ "count": 14, "length": 13.125, "height": 13.125 }))]
pub struct ShelfSetRequest {
    pub count: usize,
    pub length: f64,
    pub height: f64,
}

#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "games": [
            { "name": "Azul", "width": 10.25, "height": 3.0 },
            { "name": "Root", "width": 11.0, "height": 3.5 }
        ],
        "shelves": { "count": 2, "length": 13.125, "height": 13.125 },
        "ordering": "width_then_height",
        "enforce_shelf_height": true
    })
)]
pub struct AllocateRequest {
    pub games: Vec<GameRequest>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub shelves: Option<ShelfSetRequest>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub ordering: Option<OrderingStrategy>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub enforce_shelf_height: Option<bool>,
}

#[derive(Debug)]
struct ValidatedAllocateRequest {
    games: Vec<BoardGame>,
    config: PlanningConfig,
}

impl ValidatedAllocateRequest {
    fn game_count(&self) -> usize {
        self.games.len()
    }

    fn shelf_count(&self) -> usize {
        self.config.shelves.count
    }

    fn into_parts(self) -> (Vec<BoardGame>, PlanningConfig) {
        (self.games, self.config)
    }
}

#[derive(Debug)]
enum AllocateRequestValidationError {
    InvalidShelves(ValidationError),
    InvalidGame(ValidationError),
}

impl AllocateRequest {
    fn into_validated(
        self,
        defaults: PlanningConfig,
    ) -> Result<ValidatedAllocateRequest, AllocateRequestValidationError> {
        let mut shelves = match self.shelves {
            Some(requested) => ShelfBlueprint::new(requested.count, requested.length, requested.height)
                .map_err(AllocateRequestValidationError::InvalidShelves)?
                .with_height_rule(defaults.shelves.height_rule),
            None => defaults.shelves,
        };
        if let Some(enforce) = self.enforce_shelf_height {
            shelves.height_rule = if enforce {
                HeightRule::Enforce
            } else {
                HeightRule::Permissive
            };
        }

        let games = self
            .games
            .into_iter()
            .map(|g| BoardGame::new(g.name, g.width, g.height))
            .collect::<Result<Vec<_>, ValidationError>>()
            .map_err(AllocateRequestValidationError::InvalidGame)?;

        Ok(ValidatedAllocateRequest {
            games,
            config: PlanningConfig::builder()
                .shelves(shelves)
                .ordering(self.ordering.unwrap_or(defaults.ordering))
                .build(),
        })
    }
}

/// Response structure with the filled shelves.
#[derive(Serialize, ToSchema)]
pub struct AllocateResponse {
    pub shelves: Vec<PlannedShelf>,
    pub unplaced: Vec<UnplacedGameEntry>,
    pub is_complete: bool,
    pub metrics: AllocationMetrics,
}

/// Single shelf with its stacks, left to right.
#[derive(Serialize, ToSchema)]
pub struct PlannedShelf {
    /// Shelf number (1-based)
    pub id: usize,
    pub max_length: f64,
    pub max_height: f64,
    pub remaining_length: f64,
    pub stacks: Vec<PlannedStack>,
}

/// Single stack with its games, bottom to top.
#[derive(Serialize, ToSchema)]
pub struct PlannedStack {
    /// Stack number within the shelf (1-based)
    pub id: usize,
    pub base_width: f64,
    pub remaining_height: f64,
    pub games: Vec<BoardGame>,
}

#[derive(Serialize, ToSchema)]
pub struct UnplacedGameEntry {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub reason_code: String,
    pub reason: String,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn planning_error(err: PlanningError) -> Response {
    match err {
        PlanningError::InvalidShelves(err) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid shelf configuration",
            err.to_string(),
        ),
        PlanningError::Placement(err) => {
            eprintln!("❌ Allocation invariant violated: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Allocation failed",
                err.to_string(),
            )
        }
    }
}

fn parse_allocate_request(
    payload: Result<Json<AllocateRequest>, JsonRejection>,
    defaults: PlanningConfig,
) -> Result<ValidatedAllocateRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    match payload.into_validated(defaults) {
        Ok(validated) => Ok(validated),
        Err(AllocateRequestValidationError::InvalidShelves(err)) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid shelf configuration",
            err.to_string(),
        )),
        Err(AllocateRequestValidationError::InvalidGame(err)) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid input data",
            err.to_string(),
        )),
    }
}

fn run_allocation(request: ValidatedAllocateRequest) -> Result<AllocationResult, Response> {
    println!(
        "📥 New allocation request: {} games, {} shelves",
        request.game_count(),
        request.shelf_count()
    );
    let (games, config) = request.into_parts();
    let result = plan_with_config(games, &config).map_err(planning_error)?;
    println!(
        "📚 Result: {} games placed in {} stacks, {} unplaced",
        result.placed_count(),
        result.stack_count(),
        result.unplaced_count()
    );
    Ok(result)
}

impl AllocateResponse {
    pub fn from_allocation_result(result: AllocationResult) -> Self {
        let metrics = AllocationMetrics::from_shelves(&result.shelves, result.unplaced_count());
        let AllocationResult { shelves, unplaced } = result;

        Self {
            is_complete: unplaced.is_empty(),
            shelves: shelves
                .iter()
                .enumerate()
                .map(|(i, shelf)| PlannedShelf {
                    id: i + 1,
                    max_length: shelf.max_length(),
                    max_height: shelf.max_height(),
                    remaining_length: shelf.remaining_length(),
                    stacks: shelf
                        .stacks()
                        .iter()
                        .enumerate()
                        .map(|(j, stack)| PlannedStack {
                            id: j + 1,
                            base_width: stack.base_width(),
                            remaining_height: stack.remaining_height(),
                            games: stack.games().to_vec(),
                        })
                        .collect(),
                })
                .collect(),
            unplaced: unplaced
                .into_iter()
                .map(|entry| UnplacedGameEntry {
                    name: entry.game.name().to_string(),
                    width: entry.game.width(),
                    height: entry.game.height(),
                    reason_code: entry.reason.code().to_string(),
                    reason: entry.reason.to_string(),
                })
                .collect(),
            metrics,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_allocate, handle_allocate_stream, handle_visualize),
    components(
        schemas(
            AllocateRequest,
            GameRequest,
            ShelfSetRequest,
            OrderingStrategy,
            AllocateResponse,
            PlannedShelf,
            PlannedStack,
            UnplacedGameEntry,
            ErrorResponse,
            BoardGame,
            AllocationMetrics,
            ShelfMetrics,
            StackMetrics,
            AllocationEvent
        )
    ),
    tags((name = "planning", description = "Endpoints for shelf allocation"))
)]
struct ApiDoc;

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        // API endpoints
        .route("/allocate", post(handle_allocate))
        .route("/allocate_stream", post(handle_allocate_stream))
        .route("/visualize", post(handle_visualize))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web-UI (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, planner_config: PlannerConfig) -> std::io::Result<()> {
    let app = router(ApiState { planner_config });

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let display_host = config.display_host().to_string();
    println!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("📚 API Endpoints:");
    println!("   - POST /allocate");
    println!("   - POST /allocate_stream");
    println!("   - POST /visualize");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");
    println!("🌐 Web-UI: http://{}:{}", display_host, config.port());

    axum::serve(listener, app).await
}

/// Handler for POST /allocate endpoint.
///
/// Orders the games and places them onto the shelves.
#[utoipa::path(
    post,
    path = "/allocate",
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Allocation finished (possibly with unplaced games)", body = AllocateResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid games or shelf configuration",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_allocate(
    State(state): State<ApiState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_allocate_request(payload, state.planner_config.planning_config()) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match run_allocation(request) {
        Ok(result) => (
            StatusCode::OK,
            Json(AllocateResponse::from_allocation_result(result)),
        )
            .into_response(),
        Err(response) => response,
    }
}

/// One server-sent event of a streamed allocation.
#[derive(Debug, PartialEq)]
enum StreamMessage {
    /// Serialized `AllocationEvent`
    Progress(String),
    /// Final message when planning fails
    Failed(String),
}

impl StreamMessage {
    fn into_event(self) -> Event {
        match self {
            StreamMessage::Progress(json) => Event::default().data(json),
            StreamMessage::Failed(message) => Event::default().event("error").data(message),
        }
    }
}

/// Runs a planning job and forwards its events to `tx`.
///
/// A failed run ends the stream with a `Failed` message.
fn stream_allocation(
    games: Vec<BoardGame>,
    config: &PlanningConfig,
    tx: &mpsc::Sender<StreamMessage>,
) {
    let outcome = plan_with_progress(games, config, |evt| {
        if let Ok(json) = serde_json::to_string(evt) {
            // A closed receiver means the client went away; later events are dropped.
            let _ = tx.blocking_send(StreamMessage::Progress(json));
        }
    });
    if let Err(err) = outcome {
        eprintln!("❌ Streaming allocation failed: {err}");
        let _ = tx.blocking_send(StreamMessage::Failed(err.to_string()));
    }
}

/// Handler for POST /allocate_stream endpoint (SSE).
///
/// Streams allocation events as Server-Sent Events (text/event-stream) so a
/// client can draw the shelves filling up.
#[utoipa::path(
    post,
    path = "/allocate_stream",
    request_body = AllocateRequest,
    responses(
        (
            status = 200,
            description = "Streams allocation events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid games or shelf configuration",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_allocate_stream(
    State(state): State<ApiState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_allocate_request(payload, state.planner_config.planning_config()) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (games, config) = request.into_parts();
    let (tx, rx) = mpsc::channel::<StreamMessage>(32);

    tokio::task::spawn_blocking(move || stream_allocation(games, &config, &tx));

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(msg.into_event()));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for POST /visualize endpoint.
///
/// Runs the allocation and returns the shelf diagram as SVG.
#[utoipa::path(
    post,
    path = "/visualize",
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Shelf diagram", content_type = "image/svg+xml", body = String),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid games or shelf configuration",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_visualize(
    State(state): State<ApiState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_allocate_request(payload, state.planner_config.planning_config()) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match run_allocation(request) {
        Ok(result) => {
            let svg = render_shelves(&result.shelves, &SvgOptions::default());
            ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
        }
        Err(response) => response,
    }
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn state() -> ApiState {
        ApiState {
            planner_config: AppConfig::from_lookup(&|_: &str| None).planner,
        }
    }

    fn request(json: &str) -> Result<Json<AllocateRequest>, JsonRejection> {
        Ok(Json(serde_json::from_str(json).expect("Should parse valid JSON")))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        for path in ["/allocate", "/allocate_stream", "/visualize"] {
            assert!(
                paths.contains_key(path),
                "OpenAPI documentation is missing the {} path",
                path
            );
        }
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        for name in ["AllocateRequest", "AllocateResponse", "ErrorResponse", "BoardGame"] {
            assert!(
                components.schemas.contains_key(name),
                "Expected schema '{}' is missing from OpenAPI document",
                name
            );
        }
    }

    #[test]
    fn request_without_shelves_uses_server_defaults() {
        let parsed: AllocateRequest =
            serde_json::from_str(r#"{ "games": [{ "name": "Azul", "width": 10.25, "height": 3 }] }"#)
                .unwrap();
        let validated = parsed.into_validated(PlanningConfig::default()).unwrap();

        assert_eq!(validated.game_count(), 1);
        assert_eq!(validated.shelf_count(), 14);
        assert_eq!(validated.config.ordering, OrderingStrategy::WidthThenHeight);
        assert_eq!(validated.config.shelves.height_rule, HeightRule::Enforce);
    }

    #[test]
    fn request_overrides_ordering_and_height_rule() {
        let parsed: AllocateRequest = serde_json::from_str(
            r#"{
                "games": [],
                "shelves": { "count": 2, "length": 30, "height": 12 },
                "ordering": "area",
                "enforce_shelf_height": false
            }"#,
        )
        .unwrap();
        let validated = parsed.into_validated(PlanningConfig::default()).unwrap();

        assert_eq!(validated.config.shelves.count, 2);
        assert_eq!(validated.config.shelves.length, 30.0);
        assert_eq!(validated.config.ordering, OrderingStrategy::Area);
        assert_eq!(validated.config.shelves.height_rule, HeightRule::Permissive);
    }

    #[test]
    fn request_with_invalid_game_is_rejected() {
        let parsed: AllocateRequest = serde_json::from_str(
            r#"{ "games": [{ "name": "Flat", "width": 10, "height": 0 }] }"#,
        )
        .unwrap();
        assert!(matches!(
            parsed.into_validated(PlanningConfig::default()),
            Err(AllocateRequestValidationError::InvalidGame(_))
        ));
    }

    #[tokio::test]
    async fn allocate_returns_shelves_unplaced_and_metrics() {
        let response = handle_allocate(
            State(state()),
            request(
                r#"{
                    "games": [
                        { "name": "A", "width": 6, "height": 4 },
                        { "name": "B", "width": 6, "height": 5 },
                        { "name": "Huge", "width": 20, "height": 1 }
                    ],
                    "shelves": { "count": 1, "length": 10, "height": 10 }
                }"#,
            ),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["is_complete"], false);
        assert_eq!(body["shelves"][0]["remaining_length"], 4.0);
        assert_eq!(body["shelves"][0]["stacks"][0]["remaining_height"], 1.0);
        assert_eq!(body["shelves"][0]["stacks"][0]["games"][1]["name"], "B");
        assert_eq!(body["unplaced"][0]["name"], "Huge");
        assert_eq!(body["unplaced"][0]["reason_code"], "wider_than_every_shelf");
        assert_eq!(body["metrics"]["placed_games"], 2);
    }

    #[tokio::test]
    async fn allocate_rejects_invalid_shelves() {
        let response = handle_allocate(
            State(state()),
            request(r#"{ "games": [], "shelves": { "count": 1, "length": -3, "height": 10 } }"#),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid shelf configuration");
    }

    #[tokio::test]
    async fn allocate_rejects_shelf_count_above_limit() {
        let response = handle_allocate(
            State(state()),
            request(
                r#"{ "games": [], "shelves": { "count": 18446744073709551615, "length": 1, "height": 1 } }"#,
            ),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid shelf configuration");
        assert!(
            body["details"]
                .as_str()
                .unwrap()
                .contains("Shelf count must be at most")
        );
    }

    #[test]
    fn stream_forwards_events_until_finished() {
        let (tx, mut rx) = mpsc::channel(32);
        let config = PlanningConfig::builder()
            .shelves(ShelfBlueprint::new(1, 10.0, 10.0).unwrap())
            .build();
        stream_allocation(
            vec![BoardGame::new("Azul", 6.0, 4.0).unwrap()],
            &config,
            &tx,
        );
        drop(tx);

        let mut messages = Vec::new();
        while let Some(msg) = rx.blocking_recv() {
            messages.push(msg);
        }
        assert!(
            messages
                .iter()
                .all(|msg| matches!(msg, StreamMessage::Progress(_)))
        );
        match messages.last() {
            Some(StreamMessage::Progress(json)) => assert!(json.contains("\"Finished\"")),
            other => panic!("expected a finished event, got {:?}", other),
        }
    }

    #[test]
    fn stream_ends_with_error_message_when_planning_fails() {
        let (tx, mut rx) = mpsc::channel(32);
        let config = PlanningConfig::builder()
            .shelves(ShelfBlueprint {
                count: 1,
                length: -1.0,
                ..ShelfBlueprint::default()
            })
            .build();
        stream_allocation(
            vec![BoardGame::new("Azul", 6.0, 4.0).unwrap()],
            &config,
            &tx,
        );
        drop(tx);

        let mut messages = Vec::new();
        while let Some(msg) = rx.blocking_recv() {
            messages.push(msg);
        }
        match messages.as_slice() {
            [StreamMessage::Failed(message)] => assert!(message.contains("must be positive")),
            other => panic!("expected a single failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn visualize_returns_svg() {
        let response = handle_visualize(
            State(state()),
            request(
                r#"{
                    "games": [{ "name": "Azul", "width": 10.25, "height": 3 }],
                    "shelves": { "count": 1, "length": 13.125, "height": 13.125 }
                }"#,
            ),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/svg+xml"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.contains(">Azul</text>"));
    }

    #[tokio::test]
    async fn index_page_is_embedded() {
        let response = serve_index().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn web_script_handles_comma_names_and_stream_errors() {
        let response = serve_static("/app.js".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let script = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(script.contains("line.lastIndexOf(\",\")"));
        assert!(script.contains("kind === \"error\""));
    }
}
