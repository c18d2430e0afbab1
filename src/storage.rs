//! Saved route store backed by an embedded fjall keyspace
//!
//! All routes live as one postcard-encoded list under a single key. A mutex
//! serializes the read-modify-write of `save` and `delete`.

use std::path::Path;

use chrono::{DateTime, Utc};
use fjall::Keyspace;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info};

use crate::error::RoutecastError;
use crate::models::SavedRoute;

const ROUTES_KEY: &str = "saved_routes";

pub struct RouteStore {
    store: Keyspace,
    write_lock: Mutex<()>,
}

fn storage_error(context: &str, err: impl std::fmt::Display) -> RoutecastError {
    RoutecastError::storage(format!("{context}: {err}"))
}

fn read_routes(store: Keyspace) -> crate::Result<Vec<SavedRoute>> {
    let bytes = store
        .get(ROUTES_KEY.as_bytes())
        .map_err(|e| storage_error("Failed to read saved routes", e))?;
    match bytes {
        Some(bytes) => postcard::from_bytes(&bytes)
            .map_err(|e| storage_error("Failed to decode saved routes", e)),
        None => Ok(Vec::new()),
    }
}

fn write_routes(store: Keyspace, routes: &[SavedRoute]) -> crate::Result<()> {
    let bytes =
        postcard::to_stdvec(routes).map_err(|e| storage_error("Failed to encode saved routes", e))?;
    store
        .insert(ROUTES_KEY.as_bytes().to_vec(), bytes)
        .map_err(|e| storage_error("Failed to write saved routes", e))
}

/// Milliseconds since epoch, bumped past every id already in use
fn next_id(routes: &[SavedRoute], now: DateTime<Utc>) -> u64 {
    let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    match routes.iter().map(|r| r.id).max() {
        Some(max) if max >= candidate => max + 1,
        _ => candidate,
    }
}

impl RouteStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let db = fjall::Database::builder(path)
            .open()
            .map_err(|e| storage_error("Failed to open route database", e))?;
        let store = db
            .keyspace("routes", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| storage_error("Failed to open routes keyspace", e))?;
        debug!("Opened route store at {:?}", path);
        Ok(Self {
            store,
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> crate::Result<Vec<SavedRoute>> {
        let store = self.store.clone();
        task::spawn_blocking(move || read_routes(store))
            .await
            .map_err(|e| storage_error("Route store task failed", e))?
    }

    async fn persist(&self, routes: Vec<SavedRoute>) -> crate::Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || write_routes(store, &routes))
            .await
            .map_err(|e| storage_error("Route store task failed", e))?
    }

    /// Save a route summary; returns it with its assigned id
    #[tracing::instrument(name = "save_route", level = "debug", skip(self, route))]
    pub async fn save(&self, mut route: SavedRoute) -> crate::Result<SavedRoute> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        route.id = next_id(&routes, Utc::now());
        routes.push(route.clone());
        self.persist(routes).await?;
        info!(
            "Saved route {} -> {} with id {}",
            route.departure, route.arrival, route.id
        );
        Ok(route)
    }

    /// All saved routes, most recently saved first
    pub async fn list(&self) -> crate::Result<Vec<SavedRoute>> {
        let mut routes = self.load().await?;
        routes.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));
        Ok(routes)
    }

    /// Delete the route with `id`; `false` if there was none
    #[tracing::instrument(name = "delete_route", level = "debug", skip(self))]
    pub async fn delete(&self, id: u64) -> crate::Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        let before = routes.len();
        routes.retain(|r| r.id != id);
        if routes.len() == before {
            debug!("No saved route with id {}", id);
            return Ok(false);
        }
        self.persist(routes).await?;
        Ok(true)
    }
}
