//! WebSocket Relay
//!
//! This module bridges one client WebSocket to one live agent session. It is
//! structured into submodules:
//!
//! - `protocol`: the JSON/binary frame format spoken with the client.
//! - `staging`: the single-slot cell pairing a binary announce with its payload.
//! - `outbound`: translates agent events into client frames (agent -> client).
//! - `inbound`: classifies client frames and injects content (client -> agent).
//! - `session`: the connection lifecycle, from upgrade to teardown.

pub mod inbound;
pub mod outbound;
pub mod protocol;
pub mod session;
pub mod staging;

pub use session::ws_handler;
