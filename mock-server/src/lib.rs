//! In-memory stand-in for the translations service.
//!
//! Serves the same routes as the real API. Blobs are stored as
//! `{ data, blobId, metadata }`; a structure PATCH is applied to the
//! service's structure document and to the `data` of every stored blob,
//! skipping operations that do not fit a given document.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use translations_core::{patch, PatchOperation, PutBlobBody};

#[derive(Debug, Clone, Default)]
pub struct Service {
    pub descriptor: Value,
    pub structure: Value,
    pub blobs: BTreeMap<String, Value>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Service>>>;

/// Shared server state. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    db: Db,
    token: Option<Arc<str>>,
    patch_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `Authorization: Bearer <token>` on every route.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Arc::from(token.into()));
        self
    }

    pub async fn add_service(&self, id: &str, name: &str) {
        let service = Service {
            descriptor: json!({"id": id, "name": name}),
            structure: json!({}),
            blobs: BTreeMap::new(),
        };
        self.db.write().await.insert(id.to_string(), service);
    }

    /// Store `data` as the blob for `language`, creating the service when
    /// needed.
    pub async fn insert_blob(&self, id: &str, language: &str, data: Value) {
        let mut db = self.db.write().await;
        let service = db.entry(id.to_string()).or_insert_with(|| Service {
            descriptor: json!({"id": id}),
            structure: json!({}),
            blobs: BTreeMap::new(),
        });
        service
            .blobs
            .insert(language.to_string(), json!({"data": data, "blobId": language}));
    }

    pub async fn set_structure(&self, id: &str, structure: Value) {
        if let Some(service) = self.db.write().await.get_mut(id) {
            service.structure = structure;
        }
    }

    pub async fn blob(&self, id: &str, language: &str) -> Option<Value> {
        self.db.read().await.get(id)?.blobs.get(language).cloned()
    }

    pub async fn structure(&self, id: &str) -> Option<Value> {
        self.db.read().await.get(id).map(|service| service.structure.clone())
    }

    /// Number of structure PATCH requests that reached the handler.
    pub fn patch_count(&self) -> usize {
        self.patch_count.load(Ordering::SeqCst)
    }
}

pub fn app() -> Router {
    app_with_state(AppState::new())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/v1/services", get(list_services))
        .route("/v1/services/{id}", get(describe_service))
        .route(
            "/v1/services/{id}/blobs/{language}",
            get(get_blob).put(put_blob),
        )
        .route(
            "/v1/services/{id}/structure",
            axum::routing::patch(patch_structure),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::new()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(next.run(request).await);
    };
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    match provided {
        None => Err(StatusCode::UNAUTHORIZED),
        Some(value) if value.strip_prefix("Bearer ") == Some(expected) => {
            Ok(next.run(request).await)
        }
        Some(_) => Err(StatusCode::FORBIDDEN),
    }
}

async fn list_services(State(state): State<AppState>) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    Json(db.values().map(|service| service.descriptor.clone()).collect())
}

async fn describe_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let db = state.db.read().await;
    db.get(&id)
        .map(|service| Json(service.descriptor.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_blob(
    State(state): State<AppState>,
    Path((id, language)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    state.blob(&id, &language).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn put_blob(
    State(state): State<AppState>,
    Path((id, language)): Path<(String, String)>,
    Json(input): Json<PutBlobBody>,
) -> Result<Json<Value>, StatusCode> {
    let mut db = state.db.write().await;
    let service = db.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let stored = json!({
        "data": input.blob,
        "blobId": language,
        "metadata": input.metadata,
    });
    service.blobs.insert(language, stored.clone());
    Ok(Json(stored))
}

async fn patch_structure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(operations): Json<Vec<PatchOperation>>,
) -> Result<Json<Value>, StatusCode> {
    state.patch_count.fetch_add(1, Ordering::SeqCst);
    let mut db = state.db.write().await;
    let service = db.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    // best effort: not every blob carries every key
    for operation in &operations {
        apply_best_effort(&mut service.structure, operation, "structure");
        for (language, blob) in service.blobs.iter_mut() {
            if let Some(data) = blob.get_mut("data") {
                apply_best_effort(data, operation, language);
            }
        }
    }
    tracing::info!(service = %id, operations = operations.len(), "structure patched");
    Ok(Json(service.structure.clone()))
}

/// Apply a single operation to `doc`. An operation that does not fit is
/// logged and skipped; returns whether it was applied.
fn apply_best_effort(doc: &mut Value, operation: &PatchOperation, document: &str) -> bool {
    match patch::apply(doc, std::slice::from_ref(operation)) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(
                document,
                op = operation.op(),
                path = operation.path(),
                error = %err,
                "patch operation skipped"
            );
            false
        }
    }
}
