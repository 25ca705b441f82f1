//! Defines the WebSocket message protocol between the client and the relay.
//!
//! Text frames carry UTF-8 JSON; raw binary frames are only valid immediately
//! after the JSON frame announcing them. That announce-then-payload pairing is
//! the one intra-direction ordering contract on each side of the connection.

use anyhow::Result;
use axum::extract::ws::Message;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type of streamed text deltas.
pub const TEXT_PLAIN_MIME: &str = "text/plain";

/// Role attached to everything the agent produces.
pub const MODEL_ROLE: &str = "model";

fn default_role() -> String {
    "user".to_string()
}

/// Metadata describing an immediately-following binary frame.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BinaryDescriptor {
    pub mime_type: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub filename: Option<String>,
}

/// Messages sent from the client to the relay as JSON text frames.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A text message for the agent.
    Text {
        data: String,
        #[serde(default = "default_role")]
        role: String,
    },
    /// Announces that the next frame on this connection is raw binary data.
    Binary(BinaryDescriptor),
    /// A well-formed frame whose `type` this relay does not handle.
    #[serde(other)]
    Unknown,
}

/// JSON frames sent from the relay to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A chunk of streamed model text.
    Text {
        mime_type: String,
        data: String,
        role: String,
    },
    /// Announces that the next frame on this connection is raw binary data.
    Binary { mime_type: String, role: String },
}

/// Turn boundary notification; the one outbound frame without a `type` tag.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStatus {
    pub turn_complete: bool,
    pub interrupted: bool,
}

/// A single frame queued for delivery to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    Turn(TurnStatus),
    Message(ServerMessage),
    Payload(Bytes),
}

impl WireMessage {
    /// Serializes the frame into a raw WebSocket message.
    pub fn into_ws(self) -> Result<Message> {
        Ok(match self {
            WireMessage::Turn(status) => Message::Text(serde_json::to_string(&status)?.into()),
            WireMessage::Message(message) => {
                Message::Text(serde_json::to_string(&message)?.into())
            }
            WireMessage::Payload(data) => Message::Binary(data),
        })
    }
}
