//! Client-to-agent messaging.
//!
//! Classifies every frame arriving from the client and routes it: JSON text
//! frames inject content or stage binary metadata, raw binary frames are
//! paired with the staged descriptor and injected through the matching path.

use crate::ws::{
    protocol::{BinaryDescriptor, ClientMessage},
    staging::BinaryStaging,
};
use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{StreamExt, stream::SplitStream};
use healthbridge_core::{
    agent::RequestSink,
    event::{AUDIO_PCM_MIME, PDF_MIME},
    extract::DocumentExtractor,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes inbound frames into the agent session.
///
/// Owned by the inbound pump task; the staging cell never leaves it.
pub struct Dispatcher {
    staging: BinaryStaging,
    requests: RequestSink,
    extractor: Arc<dyn DocumentExtractor>,
}

impl Dispatcher {
    pub fn new(requests: RequestSink, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self {
            staging: BinaryStaging::new(),
            requests,
            extractor,
        }
    }

    /// Handles one JSON text frame. Malformed JSON is a hard error that ends
    /// the session; a well-formed frame with an unrecognized type is logged
    /// and dropped.
    pub fn handle_text(&mut self, raw: &str) -> Result<()> {
        let message: ClientMessage =
            serde_json::from_str(raw).context("malformed client frame")?;
        match message {
            ClientMessage::Text { data, role } => {
                debug!(%role, len = data.len(), "client text injected");
                self.requests.send_content(role, data)?;
            }
            ClientMessage::Binary(descriptor) => {
                debug!(mime_type = %descriptor.mime_type, "binary announce staged");
                self.staging.set_pending(descriptor);
            }
            ClientMessage::Unknown => {
                warn!("unrecognized client frame type; dropping");
            }
        }
        Ok(())
    }

    /// Handles one raw binary frame by consuming the staged descriptor.
    /// Protocol anomalies (no descriptor, unsupported mime type) are logged
    /// and dropped; the session continues.
    pub fn handle_binary(&mut self, data: Bytes) -> Result<()> {
        let Some(descriptor) = self.staging.take_pending() else {
            warn!(
                len = data.len(),
                "binary frame without a preceding announce; dropping"
            );
            return Ok(());
        };

        if descriptor.mime_type == AUDIO_PCM_MIME {
            debug!(len = data.len(), "client audio chunk injected");
            self.requests.send_realtime(descriptor.mime_type, data)?;
        } else if descriptor.mime_type == PDF_MIME {
            self.inject_document(&descriptor, &data)?;
        } else {
            warn!(
                mime_type = %descriptor.mime_type,
                "unsupported binary mime type; dropping"
            );
        }
        Ok(())
    }

    fn inject_document(&mut self, descriptor: &BinaryDescriptor, data: &[u8]) -> Result<()> {
        let filename = descriptor
            .filename
            .clone()
            .unwrap_or_else(|| "uploaded.pdf".to_string());
        info!(%filename, len = data.len(), "extracting text from uploaded document");

        match self.extractor.extract(data) {
            Ok(text) => {
                self.requests
                    .send_content(descriptor.role.clone(), document_prompt(&filename, &text))?;
                info!(%filename, "forwarded extracted document text to the agent");
            }
            Err(err) => {
                warn!(%filename, error = %err, "document text extraction failed");
                // Composed for the client, but the outbound protocol has no
                // frame for it yet; the message goes nowhere.
                let _apology = format!(
                    "Sorry, I was unable to read the file '{filename}'. It might be corrupted or in an unsupported format."
                );
            }
        }
        Ok(())
    }
}

/// Wraps extracted document text in a prompt the agent can acknowledge.
fn document_prompt(filename: &str, text: &str) -> String {
    format!(
        "The user has uploaded the file '{filename}'. \
         Here is the full text content from that file:\n\n---\n\n\
         {text}\n\n---\n\n\
         Acknowledge that you have received and understood this document. \
         Wait for the user's next question about it."
    )
}

/// Reads client frames until the connection closes or a frame fails hard.
/// A clean close is not an error; malformed frames and transport failures
/// are.
pub async fn pump(mut socket_rx: SplitStream<WebSocket>, mut dispatcher: Dispatcher) -> Result<()> {
    while let Some(frame) = socket_rx.next().await {
        match frame.context("websocket receive failed")? {
            Message::Text(text) => dispatcher.handle_text(&text)?,
            Message::Binary(data) => dispatcher.handle_binary(data)?,
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthbridge_core::{
        agent::RequestSink,
        event::AgentRequest,
        extract::{DocumentExtractor, ExtractError},
    };
    use tokio::sync::mpsc::UnboundedReceiver;

    struct FixedExtractor(Option<String>);

    impl DocumentExtractor for FixedExtractor {
        fn extract(&self, _data: &[u8]) -> Result<String, ExtractError> {
            self.0
                .clone()
                .ok_or_else(|| ExtractError::Unreadable("scripted failure".to_string()))
        }
    }

    fn dispatcher(extracted: Option<String>) -> (Dispatcher, UnboundedReceiver<AgentRequest>) {
        let (requests, rx) = RequestSink::new();
        (
            Dispatcher::new(requests, Arc::new(FixedExtractor(extracted))),
            rx,
        )
    }

    #[tokio::test]
    async fn text_frames_inject_in_order_with_default_role() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_text(r#"{"type":"text","data":"one"}"#)
            .unwrap();
        dispatcher
            .handle_text(r#"{"type":"text","data":"two","role":"system"}"#)
            .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(AgentRequest::Content {
                role: "user".to_string(),
                text: "one".to_string()
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(AgentRequest::Content {
                role: "system".to_string(),
                text: "two".to_string()
            })
        );
    }

    #[test]
    fn malformed_json_is_a_hard_error() {
        let (mut dispatcher, _rx) = dispatcher(None);
        assert!(dispatcher.handle_text("{not json").is_err());
        assert!(
            dispatcher
                .handle_text(r#"{"type":"text"}"#)
                .is_err(),
            "missing required field must fail"
        );
    }

    #[test]
    fn unrecognized_frame_type_is_dropped_and_session_continues() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_text(r#"{"type":"video","data":"x"}"#)
            .unwrap();
        assert!(rx.try_recv().is_err());

        // The next frame is processed normally.
        dispatcher
            .handle_text(r#"{"type":"text","data":"still here"}"#)
            .unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn announce_then_payload_injects_exactly_one_item() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_text(r#"{"type":"binary","mime_type":"audio/pcm"}"#)
            .unwrap();
        // Nothing is injected by the announce alone.
        assert!(rx.try_recv().is_err());

        dispatcher
            .handle_binary(Bytes::from_static(b"\x00\x01"))
            .unwrap();
        assert_eq!(
            rx.recv().await,
            Some(AgentRequest::Realtime {
                mime_type: "audio/pcm".to_string(),
                data: Bytes::from_static(b"\x00\x01"),
            })
        );
        // The descriptor is consumed: a second payload is an anomaly, not
        // a second injection.
        dispatcher
            .handle_binary(Bytes::from_static(b"\x02"))
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn payload_without_announce_is_dropped_and_session_continues() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_binary(Bytes::from_static(b"orphan"))
            .unwrap();
        assert!(rx.try_recv().is_err());

        // The next frame is processed normally.
        dispatcher
            .handle_text(r#"{"type":"text","data":"still here"}"#)
            .unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn pdf_payload_injects_extracted_text_with_filename() {
        let (mut dispatcher, mut rx) = dispatcher(Some("LAB RESULTS".to_string()));
        dispatcher
            .handle_text(
                r#"{"type":"binary","mime_type":"application/pdf","filename":"r.pdf"}"#,
            )
            .unwrap();
        dispatcher
            .handle_binary(Bytes::from_static(b"%PDF-1.4"))
            .unwrap();

        match rx.recv().await {
            Some(AgentRequest::Content { role, text }) => {
                assert_eq!(role, "user");
                assert!(text.contains("LAB RESULTS"));
                assert!(text.contains("r.pdf"));
            }
            other => panic!("expected text injection, got {other:?}"),
        }
    }

    #[test]
    fn extraction_failure_injects_nothing() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_text(r#"{"type":"binary","mime_type":"application/pdf"}"#)
            .unwrap();
        dispatcher
            .handle_binary(Bytes::from_static(b"corrupt"))
            .unwrap();
        // The apology composed here is never delivered anywhere.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsupported_mime_type_is_dropped() {
        let (mut dispatcher, mut rx) = dispatcher(None);
        dispatcher
            .handle_text(r#"{"type":"binary","mime_type":"image/png"}"#)
            .unwrap();
        dispatcher
            .handle_binary(Bytes::from_static(b"png"))
            .unwrap();
        assert!(rx.try_recv().is_err());
    }
}
