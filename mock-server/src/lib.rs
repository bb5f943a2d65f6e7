use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const PAGE_SIZE: usize = 20;
const STATES: [&str; 3] = ["resolved", "unresolved", "pending"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub session_id: String,
    pub website_id: String,
    pub state: String,
    pub is_blocked: bool,
    pub meta: Value,
    #[serde(skip)]
    pub routing: Value,
    #[serde(skip)]
    pub messages: Vec<Message>,
    #[serde(skip)]
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub fingerprint: u64,
    pub from: String,
    pub origin: String,
    pub content: Value,
    pub timestamp: u64,
    #[serde(default)]
    pub delivered: bool,
    #[serde(default)]
    pub read: bool,
}

#[derive(Deserialize)]
pub struct NewMessage {
    pub from: String,
    pub origin: String,
    #[serde(default)]
    pub content: Value,
}

#[derive(Deserialize)]
pub struct StateUpdate {
    pub state: String,
}

#[derive(Deserialize)]
pub struct BlockUpdate {
    pub blocked: bool,
}

#[derive(Deserialize)]
pub struct Acknowledgement {
    pub from: String,
    pub origin: String,
    pub fingerprints: Vec<u64>,
}

#[derive(Default)]
pub struct Store {
    conversations: HashMap<(String, String), Conversation>,
    created: u64,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let conversation = "/v1/website/{website_id}/conversation/{session_id}";
    Router::new()
        .route("/v1/website/{website_id}/conversations/{page}", get(list_conversations))
        .route("/v1/website/{website_id}/conversation", post(create_conversation))
        .route(conversation, get(get_conversation).delete(delete_conversation))
        .route(&format!("{conversation}/initiate"), post(initiate_conversation))
        .route(&format!("{conversation}/message"), post(send_message))
        .route(&format!("{conversation}/messages"), get(get_messages))
        .route(&format!("{conversation}/compose"), patch(compose_message))
        .route(&format!("{conversation}/state"), patch(set_state))
        .route(&format!("{conversation}/routing"), get(get_routing).patch(set_routing))
        .route(&format!("{conversation}/meta"), get(get_meta).patch(update_meta))
        .route(&format!("{conversation}/block"), patch(set_block))
        .route(&format!("{conversation}/delivered"), patch(delivered_messages))
        .route(&format!("{conversation}/read"), patch(read_messages))
        .layer(middleware::from_fn(require_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reply(status: StatusCode, reason: &str, data: Value) -> Reply {
    (
        status,
        Json(json!({
            "error": !status.is_success(),
            "reason": reason,
            "data": data,
        })),
    )
}

fn not_found() -> Reply {
    reply(StatusCode::NOT_FOUND, "session_not_found", json!({}))
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

async fn require_auth(request: Request, next: Next) -> Response {
    if request.headers().get(header::AUTHORIZATION).is_none() {
        return reply(StatusCode::UNAUTHORIZED, "invalid_session", json!({})).into_response();
    }
    next.run(request).await
}

async fn list_conversations(
    State(db): State<Db>,
    Path((website_id, page)): Path<(String, usize)>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let store = db.read().await;
    let flag = |key: &str| params.get(key).is_some_and(|v| v == "true" || v == "1");
    let search = params.get("search_query").map(|q| q.to_lowercase());

    let mut matching: Vec<&Conversation> = store
        .conversations
        .values()
        .filter(|c| c.website_id == website_id)
        .filter(|c| !flag("filter_resolved") || c.state == "resolved")
        .filter(|c| !flag("filter_not_resolved") || c.state != "resolved")
        .filter(|c| {
            search.as_ref().is_none_or(|q| {
                c.messages
                    .iter()
                    .any(|m| m.content.as_str().is_some_and(|t| t.to_lowercase().contains(q)))
            })
        })
        .collect();
    matching.sort_by_key(|c| c.created_at);

    let data: Vec<&Conversation> = matching
        .into_iter()
        .skip(page.saturating_sub(1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    reply(StatusCode::OK, "listed", json!(data))
}

async fn create_conversation(State(db): State<Db>, Path(website_id): Path<String>) -> Reply {
    let mut store = db.write().await;
    store.created += 1;
    let conversation = Conversation {
        session_id: format!("session_{}", Uuid::new_v4()),
        website_id: website_id.clone(),
        state: "pending".to_string(),
        is_blocked: false,
        meta: json!({}),
        routing: json!({}),
        messages: Vec::new(),
        created_at: store.created,
    };
    let session_id = conversation.session_id.clone();
    tracing::info!(%website_id, %session_id, "conversation created");
    store
        .conversations
        .insert((website_id, session_id.clone()), conversation);
    reply(StatusCode::CREATED, "added", json!({ "session_id": session_id }))
}

async fn get_conversation(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Reply {
    let store = db.read().await;
    match store.conversations.get(&key) {
        Some(conversation) => reply(StatusCode::OK, "resolved", json!(conversation)),
        None => not_found(),
    }
}

async fn delete_conversation(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Reply {
    let mut store = db.write().await;
    match store.conversations.remove(&key) {
        Some(_) => reply(StatusCode::OK, "deleted", json!({})),
        None => not_found(),
    }
}

async fn initiate_conversation(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Reply {
    let store = db.read().await;
    if !store.conversations.contains_key(&key) {
        return not_found();
    }
    reply(StatusCode::OK, "initiated", json!({}))
}

async fn send_message(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(input): Json<NewMessage>,
) -> Reply {
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    let last = conversation.messages.last();
    let fingerprint = last.map_or(1, |m| m.fingerprint + 1);
    let timestamp = now_millis().max(last.map_or(0, |m| m.timestamp + 1));
    conversation.messages.push(Message {
        fingerprint,
        from: input.from,
        origin: input.origin,
        content: input.content,
        timestamp,
        delivered: false,
        read: false,
    });
    reply(StatusCode::ACCEPTED, "dispatched", json!({ "fingerprint": fingerprint }))
}

async fn get_messages(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let store = db.read().await;
    let Some(conversation) = store.conversations.get(&key) else {
        return not_found();
    };
    let before = match params.get("timestamp_before").map(|v| v.parse::<u64>()) {
        Some(Ok(t)) => Some(t),
        Some(Err(_)) => return reply(StatusCode::BAD_REQUEST, "invalid_data", json!({})),
        None => None,
    };
    let messages: Vec<&Message> = conversation
        .messages
        .iter()
        .filter(|m| before.is_none_or(|t| m.timestamp < t))
        .collect();
    reply(StatusCode::OK, "listed", json!(messages))
}

async fn compose_message(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(_input): Json<Value>,
) -> Reply {
    let store = db.read().await;
    if !store.conversations.contains_key(&key) {
        return not_found();
    }
    reply(StatusCode::OK, "updated", json!({}))
}

async fn set_state(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(input): Json<StateUpdate>,
) -> Reply {
    if !STATES.contains(&input.state.as_str()) {
        return reply(StatusCode::BAD_REQUEST, "invalid_state", json!({}));
    }
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    conversation.state = input.state;
    reply(StatusCode::OK, "updated", json!({}))
}

async fn get_routing(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Reply {
    let store = db.read().await;
    match store.conversations.get(&key) {
        Some(conversation) => reply(StatusCode::OK, "resolved", conversation.routing.clone()),
        None => not_found(),
    }
}

async fn set_routing(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(assign): Json<Value>,
) -> Reply {
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    conversation.routing = assign;
    reply(StatusCode::OK, "updated", json!({}))
}

async fn get_meta(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Reply {
    let store = db.read().await;
    match store.conversations.get(&key) {
        Some(conversation) => reply(StatusCode::OK, "resolved", conversation.meta.clone()),
        None => not_found(),
    }
}

/// Merges top-level keys of the update into the stored meta.
async fn update_meta(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(update): Json<Value>,
) -> Reply {
    let Value::Object(fields) = update else {
        return reply(StatusCode::BAD_REQUEST, "invalid_data", json!({}));
    };
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    if let Value::Object(meta) = &mut conversation.meta {
        meta.extend(fields);
    }
    reply(StatusCode::OK, "updated", json!({}))
}

async fn set_block(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(input): Json<BlockUpdate>,
) -> Reply {
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    conversation.is_blocked = input.blocked;
    reply(StatusCode::OK, "updated", json!({}))
}

async fn delivered_messages(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(input): Json<Acknowledgement>,
) -> Reply {
    acknowledge(db, key, input, |m| m.delivered = true).await
}

async fn read_messages(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(input): Json<Acknowledgement>,
) -> Reply {
    acknowledge(db, key, input, |m| {
        m.delivered = true;
        m.read = true;
    })
    .await
}

async fn acknowledge(
    db: Db,
    key: (String, String),
    input: Acknowledgement,
    mark: impl Fn(&mut Message),
) -> Reply {
    let mut store = db.write().await;
    let Some(conversation) = store.conversations.get_mut(&key) else {
        return not_found();
    };
    tracing::debug!(
        from = %input.from,
        origin = %input.origin,
        count = input.fingerprints.len(),
        "acknowledging messages"
    );
    conversation
        .messages
        .iter_mut()
        .filter(|m| input.fingerprints.contains(&m.fingerprint))
        .for_each(mark);
    reply(StatusCode::OK, "updated", json!({}))
}
