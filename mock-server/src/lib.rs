use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Multi-line body served by `/lines`, mixing CRLF and LF terminators.
pub const LINES_BODY: &str = "first line\r\nsecond line\nthird line\n";

pub const ITEM_NOT_FOUND: &str = "item not found";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct ItemFilter {
    pub name: Option<String>,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub body: String,
    pub content_type: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusParams {
    pub body: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/lines", get(lines))
        .route("/status/{code}", get(status))
        .route("/slow/{ms}", get(slow))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        body,
        content_type,
    })
}

async fn lines() -> &'static str {
    LINES_BODY
}

async fn status(
    Path(code): Path<u16>,
    Query(params): Query<StatusParams>,
) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, params.body.unwrap_or_default()))
}

async fn slow(Path(ms): Path<u64>) -> String {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    ms.to_string()
}

async fn list_items(State(db): State<Db>, Query(filter): Query<ItemFilter>) -> Json<Vec<Item>> {
    let items = db.read().await;
    let mut found: Vec<Item> = items
        .values()
        .filter(|item| filter.name.as_ref().is_none_or(|name| &item.name == name))
        .cloned()
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Json(found)
}

async fn create_item(State(db): State<Db>, Form(input): Form<CreateItem>) -> Json<Item> {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        quantity: input.quantity,
    };
    db.write().await.insert(item.id, item.clone());
    Json(item)
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, (StatusCode, &'static str)> {
    let items = db.read().await;
    items
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, ITEM_NOT_FOUND))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Form(input): Form<UpdateItem>,
) -> Result<Json<Item>, (StatusCode, &'static str)> {
    let mut items = db.write().await;
    let item = items
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, ITEM_NOT_FOUND))?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(quantity) = input.quantity {
        item.quantity = quantity;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut items = db.write().await;
    items
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or((StatusCode::NOT_FOUND, ITEM_NOT_FOUND))
}
