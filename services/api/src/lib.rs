//! Healthbridge API Library Crate
//!
//! This library contains all the logic for the Healthbridge relay service:
//! configuration, the session registry, the REST surface, the WebSocket relay
//! and the Gemini Live agent boundary. The `api` binary is a thin wrapper
//! around this library.

pub mod config;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod registry;
pub mod router;
pub mod state;
pub mod ws;
