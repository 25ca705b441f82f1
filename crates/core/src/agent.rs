//! The contract between the relay and a live conversational agent.
//!
//! A boundary implementation owns the provider connection and its protocol;
//! the relay only ever sees an [`AgentSession`]: a stream of [`AgentEvent`]s
//! and a [`RequestSink`] for injecting content.

use crate::event::{AgentEvent, AgentRequest};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Capacity of the agent-to-relay event channel. The relay consumer suspends
/// on empty; a full channel makes the boundary driver suspend rather than
/// buffer without bound.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The response modality requested for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Audio,
}

/// Per-session parameters handed to [`AgentBoundary::open_session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Client-supplied session identity.
    pub session_id: String,
    pub modality: Modality,
    /// Ask the provider to transcribe its own audio output. Only meaningful
    /// in audio mode.
    pub output_transcription: bool,
}

impl SessionConfig {
    pub fn new(session_id: impl Into<String>, audio: bool) -> Self {
        Self {
            session_id: session_id.into(),
            modality: if audio { Modality::Audio } else { Modality::Text },
            output_transcription: audio,
        }
    }
}

/// Error returned when injecting into a session whose driver has gone away.
#[derive(Debug, thiserror::Error)]
#[error("agent session is closed")]
pub struct SessionClosed;

/// Sink for requests flowing into a live agent session.
///
/// Sends never block: the underlying queue is unbounded, mirroring the
/// upstream live request queue this models.
#[derive(Debug, Clone)]
pub struct RequestSink {
    tx: mpsc::UnboundedSender<AgentRequest>,
}

impl RequestSink {
    /// Creates a sink together with the receiving half a boundary driver
    /// consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AgentRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Injects turn-based text content.
    pub fn send_content(
        &self,
        role: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), SessionClosed> {
        self.tx
            .send(AgentRequest::Content {
                role: role.into(),
                text: text.into(),
            })
            .map_err(|_| SessionClosed)
    }

    /// Injects a realtime media chunk.
    pub fn send_realtime(
        &self,
        mime_type: impl Into<String>,
        data: Bytes,
    ) -> Result<(), SessionClosed> {
        self.tx
            .send(AgentRequest::Realtime {
                mime_type: mime_type.into(),
                data,
            })
            .map_err(|_| SessionClosed)
    }
}

/// A live agent session: the event stream and the request sink returned by
/// [`AgentBoundary::open_session`].
pub struct AgentSession {
    pub events: mpsc::Receiver<AgentEvent>,
    pub requests: RequestSink,
}

/// An external conversational agent the relay can open sessions against.
#[async_trait]
pub trait AgentBoundary: Send + Sync {
    async fn open_session(&self, config: &SessionConfig) -> Result<AgentSession>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sink_preserves_request_order() {
        let (sink, mut rx) = RequestSink::new();
        sink.send_content("user", "first").unwrap();
        sink.send_realtime("audio/pcm", Bytes::from_static(b"\x00\x01"))
            .unwrap();
        sink.send_content("user", "second").unwrap();

        assert_eq!(
            rx.recv().await,
            Some(AgentRequest::Content {
                role: "user".to_string(),
                text: "first".to_string()
            })
        );
        assert!(matches!(
            rx.recv().await,
            Some(AgentRequest::Realtime { .. })
        ));
        assert_eq!(
            rx.recv().await,
            Some(AgentRequest::Content {
                role: "user".to_string(),
                text: "second".to_string()
            })
        );
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (sink, rx) = RequestSink::new();
        drop(rx);
        assert!(sink.send_content("user", "hello").is_err());
    }

    #[test]
    fn audio_session_config_requests_transcription() {
        let config = SessionConfig::new("client-1", true);
        assert_eq!(config.modality, Modality::Audio);
        assert!(config.output_transcription);

        let config = SessionConfig::new("client-1", false);
        assert_eq!(config.modality, Modality::Text);
        assert!(!config.output_transcription);
    }
}
