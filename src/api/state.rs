//! Application state for the ledger API.

use std::sync::Arc;

use crate::engine::Engine;

/// Shared application state.
///
/// Holds the engine every handler runs against.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: Engine) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    /// Creates a new application state sharing an engine with other tasks.
    pub fn from_shared(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
