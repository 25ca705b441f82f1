//! Healthbridge Core
//!
//! Shared contracts for the Healthbridge relay service: the agent-boundary
//! trait and its event/request types, and the document-extraction seam. This
//! crate carries no network code; provider implementations live in the
//! service crates.

pub mod agent;
pub mod event;
pub mod extract;
