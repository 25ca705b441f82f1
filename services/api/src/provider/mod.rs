//! Agent boundary implementations.
//!
//! The relay only sees `healthbridge_core::agent::AgentBoundary`; everything
//! provider-specific (wire format, handshake, reconnect policy) stays behind
//! that trait.

pub mod gemini;

pub use gemini::GeminiLiveBoundary;
