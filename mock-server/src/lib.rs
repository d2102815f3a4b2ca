use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Host used in `self` links, standing in for the proxy the real service
/// sits behind. Clients are expected to rewrite it.
pub const SELF_LINK_ORIGIN: &str = "https://proxy.internal";

pub const API_ROOT: &str = "/api/beta";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub data: Value,
    pub sources: Vec<Value>,
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: Value,
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Deserialize)]
pub struct CreateEntity {
    pub data: Value,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sources: Vec<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// Partial update; keys in `data` overwrite the stored ones.
#[derive(Deserialize)]
pub struct UpdateEntity {
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

pub type Db = Arc<RwLock<BTreeMap<Uuid, Entity>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    api_key: Arc<str>,
}

/// Router serving the entity endpoints, accepting only `Bearer <api_key>`.
pub fn app(api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(BTreeMap::new())),
        api_key: Arc::from(api_key),
    };
    let api = Router::new()
        .route("/entities", get(list_entities).post(create_entity))
        .route(
            "/entities/{id}",
            get(get_entity).patch(update_entity).delete(delete_entity),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);
    Router::new().nest(API_ROOT, api)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn error_body(status: StatusCode, title: &str) -> Response {
    let body = json!({"errors": [{"status": status.as_u16(), "title": title}]});
    (status, Json(body)).into_response()
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.api_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        tracing::debug!(uri = %request.uri(), "rejecting request without valid bearer token");
        return error_body(StatusCode::UNAUTHORIZED, "invalid or missing API key");
    }
    next.run(request).await
}

async fn list_entities(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<Value> {
    let entities = state.db.read().await;
    let limit = params.limit.unwrap_or(usize::MAX);
    let data: Vec<&Entity> = entities.values().take(limit).collect();
    Json(json!({"count": entities.len(), "data": data}))
}

async fn create_entity(
    State(state): State<AppState>,
    Json(input): Json<CreateEntity>,
) -> (StatusCode, Json<Value>) {
    let id = Uuid::new_v4();
    let sources = if input.sources.is_empty() {
        vec![json!({"source_id": "mock-server", "source_type": "group"})]
    } else {
        input.sources
    };
    let entity = Entity {
        id,
        data: input.data,
        sources,
        kind: input.kind,
        meta: input.meta.unwrap_or_else(|| json!({"tlp_color": "WHITE"})),
        self_link: format!("{SELF_LINK_ORIGIN}{API_ROOT}/entities/{id}"),
    };
    state.db.write().await.insert(id, entity.clone());
    (StatusCode::CREATED, Json(json!({"data": entity})))
}

async fn get_entity(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let entities = state.db.read().await;
    match entities.get(&id) {
        Some(entity) => Json(json!({"data": entity})).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "entity not found"),
    }
}

async fn update_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEntity>,
) -> Response {
    let mut entities = state.db.write().await;
    let Some(entity) = entities.get_mut(&id) else {
        return error_body(StatusCode::NOT_FOUND, "entity not found");
    };
    if let Value::Object(data) = &mut entity.data {
        data.extend(input.data);
    }
    if let Some(meta) = input.meta {
        entity.meta = meta;
    }
    Json(json!({"data": entity})).into_response()
}

async fn delete_entity(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut entities = state.db.write().await;
    match entities.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error_body(StatusCode::NOT_FOUND, "entity not found"),
    }
}
