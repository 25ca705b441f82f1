//! Agent-to-client messaging.
//!
//! Each agent event maps to zero, one or two wire frames, in arrival order.
//! Translation is pure; the pump at the bottom owns the socket sink and is
//! the only writer on the connection.

use crate::ws::protocol::{MODEL_ROLE, ServerMessage, TEXT_PLAIN_MIME, TurnStatus, WireMessage};
use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};
use healthbridge_core::event::{AUDIO_PCM_MIME, AgentEvent, Part};
use tokio::sync::mpsc;
use tracing::debug;

/// Translates one agent event into the frames owed to the client.
///
/// A turn boundary yields exactly one turn-status frame and the event's
/// content is never inspected. Otherwise only the first content part matters:
/// partial text becomes a text frame, inline PCM audio becomes an announce
/// frame followed by the raw payload, and anything else is dropped so unknown
/// content stays forward-compatible.
pub fn translate(event: &AgentEvent) -> Vec<WireMessage> {
    if event.turn_complete || event.interrupted {
        return vec![WireMessage::Turn(TurnStatus {
            turn_complete: event.turn_complete,
            interrupted: event.interrupted,
        })];
    }

    let Some(part) = event.first_part() else {
        return Vec::new();
    };

    match part {
        Part::Text(text) if event.partial => vec![WireMessage::Message(ServerMessage::Text {
            mime_type: TEXT_PLAIN_MIME.to_string(),
            data: text.clone(),
            role: MODEL_ROLE.to_string(),
        })],
        Part::InlineData { mime_type, data } if mime_type.starts_with(AUDIO_PCM_MIME) => {
            if data.is_empty() {
                return Vec::new();
            }
            vec![
                WireMessage::Message(ServerMessage::Binary {
                    mime_type: AUDIO_PCM_MIME.to_string(),
                    role: MODEL_ROLE.to_string(),
                }),
                WireMessage::Payload(data.clone()),
            ]
        }
        _ => Vec::new(),
    }
}

/// Drains the agent event stream and writes every resulting frame to the
/// client. Returns once the agent closes its stream; a delivery failure ends
/// the task instead, since a dropped delta cannot be replayed without
/// breaking ordering.
pub async fn pump(
    mut events: mpsc::Receiver<AgentEvent>,
    mut socket_tx: SplitSink<WebSocket, Message>,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        for frame in translate(&event) {
            debug!(?frame, "agent to client");
            socket_tx
                .send(frame.into_ws()?)
                .await
                .context("failed to deliver frame to client")?;
        }
    }
    debug!("agent event stream ended");
    Ok(())
}
