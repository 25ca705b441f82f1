//! Normalized types crossing the agent boundary.
//!
//! `AgentEvent` is what the live agent emits toward the relay; `AgentRequest`
//! is what the relay injects into the live agent. Both sides of the relay
//! speak only these types, never the provider's wire format.

use bytes::Bytes;

/// MIME type (prefix) for raw little-endian PCM16 audio.
pub const AUDIO_PCM_MIME: &str = "audio/pcm";

/// MIME type for uploaded PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// One notification from the live agent session.
///
/// A turn boundary carries no payload: when `turn_complete` or `interrupted`
/// is set, `content` is not inspected by consumers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentEvent {
    pub turn_complete: bool,
    pub interrupted: bool,
    /// True while the event carries an incremental chunk of a streamed reply.
    pub partial: bool,
    pub content: Option<Content>,
}

impl AgentEvent {
    /// An event signalling the end of a turn.
    pub fn turn_status(turn_complete: bool, interrupted: bool) -> Self {
        Self {
            turn_complete,
            interrupted,
            ..Self::default()
        }
    }

    /// An incremental chunk of streamed model text.
    pub fn partial_text(text: impl Into<String>) -> Self {
        Self {
            partial: true,
            content: Some(Content::model(vec![Part::Text(text.into())])),
            ..Self::default()
        }
    }

    /// A chunk of inline model audio.
    pub fn inline_audio(mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            content: Some(Content::model(vec![Part::InlineData {
                mime_type: mime_type.into(),
                data,
            }])),
            ..Self::default()
        }
    }

    /// The first content part, if any. The relay protocol defines at most one
    /// meaningful part per event.
    pub fn first_part(&self) -> Option<&Part> {
        self.content.as_ref().and_then(|content| content.parts.first())
    }
}

/// Attributed content attached to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: "model".to_string(),
            parts,
        }
    }
}

/// A single content part.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: Bytes },
}

/// One request injected into the live agent session.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentRequest {
    /// Turn-based content, delivered through the generic injection path.
    Content { role: String, text: String },
    /// A realtime media chunk, bypassing turn handling for low latency.
    Realtime { mime_type: String, data: Bytes },
}
