//! # state
//!
//! Shared state injected into every Axum handler.  Only the store and the
//! auth key live here; calendar navigation is carried by each request.

use std::sync::Arc;

use crate::store::DynStore;

#[derive(Clone)]
pub struct AppState {
    pub store:   DynStore,
    /// `None` = auth disabled (dev mode).
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(store: DynStore, api_key: Option<String>) -> Self {
        Self { store, api_key }
    }
}

pub type SharedState = Arc<AppState>;

pub fn build_state(store: DynStore, api_key: Option<String>) -> SharedState {
    Arc::new(AppState::new(store, api_key))
}
