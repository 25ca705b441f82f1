//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the agent boundary, the document extractor and the
//! session registry.

use crate::registry::SessionRegistry;
use healthbridge_core::{agent::AgentBoundary, extract::DocumentExtractor};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentBoundary>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub sessions: Arc<SessionRegistry>,
}
