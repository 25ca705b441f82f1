//! Gemini Live implementation of the agent boundary.
//!
//! Opens one BidiGenerateContent WebSocket per session, completes the setup
//! handshake, and then drives a loop that forwards injected requests upstream
//! and maps server content back into normalized agent events.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use healthbridge_core::{
    agent::{
        AgentBoundary, AgentSession, EVENT_CHANNEL_CAPACITY, Modality, RequestSink, SessionConfig,
    },
    event::{AUDIO_PCM_MIME, AgentEvent, AgentRequest, Part},
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as WsMessage,
};
use tracing::{debug, error, info, warn};

type LiveStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type LiveSink = SplitSink<LiveStream, WsMessage>;

// --- Local Gemini Live wire types (for encapsulation) ---
mod live_api_types {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) enum ClientMessage {
        Setup(BidiGenerateContentSetup),
        RealtimeInput(BidiGenerateContentRealtimeInput),
        ClientContent(BidiGenerateContentClientContent),
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct BidiGenerateContentSetup {
        pub model: String,
        pub generation_config: GenerationConfig,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub output_audio_transcription: Option<AudioTranscriptionConfig>,
    }
    #[derive(Serialize)]
    pub(super) struct AudioTranscriptionConfig {}
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerationConfig {
        pub response_modalities: Vec<ResponseModality>,
        pub speech_config: SpeechConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub(super) enum ResponseModality {
        Text,
        Audio,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SpeechConfig {
        pub language_code: String,
        pub voice_config: VoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct VoiceConfig {
        pub prebuilt_voice_config: PrebuiltVoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct PrebuiltVoiceConfig {
        pub voice_name: String,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct BidiGenerateContentClientContent {
        pub turns: Vec<ContentTurn>,
        pub turn_complete: bool,
    }
    #[derive(Serialize)]
    pub(super) struct ContentTurn {
        pub role: String,
        pub parts: Vec<TextPart>,
    }
    #[derive(Serialize)]
    pub(super) struct TextPart {
        pub text: String,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct BidiGenerateContentRealtimeInput {
        pub audio: Blob,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Blob {
        pub mime_type: String,
        pub data: String,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ServerMessage {
        pub setup_complete: Option<serde_json::Value>,
        pub server_content: Option<LiveServerContent>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct LiveServerContent {
        pub model_turn: Option<ServerContentTurn>,
        pub output_transcription: Option<ServerTranscription>,
        pub turn_complete: Option<bool>,
        pub interrupted: Option<bool>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct ServerContentTurn {
        pub parts: Vec<ServerPart>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ServerPart {
        pub text: Option<String>,
        pub inline_data: Option<ServerBlob>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ServerBlob {
        pub mime_type: Option<String>,
        pub data: String,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct ServerTranscription {
        pub text: String,
    }
}

/// Agent boundary backed by the Gemini Live API.
#[derive(Debug, Clone)]
pub struct GeminiLiveBoundary {
    api_key: String,
    model: String,
    voice_name: String,
    language_code: String,
}

impl GeminiLiveBoundary {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice_name: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            voice_name: voice_name.into(),
            language_code: language_code.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent?key={}",
            self.api_key
        )
    }

    fn setup_message(&self, config: &SessionConfig) -> live_api_types::ClientMessage {
        let modality = match config.modality {
            Modality::Text => live_api_types::ResponseModality::Text,
            Modality::Audio => live_api_types::ResponseModality::Audio,
        };
        live_api_types::ClientMessage::Setup(live_api_types::BidiGenerateContentSetup {
            model: self.model.clone(),
            generation_config: live_api_types::GenerationConfig {
                response_modalities: vec![modality],
                speech_config: live_api_types::SpeechConfig {
                    language_code: self.language_code.clone(),
                    voice_config: live_api_types::VoiceConfig {
                        prebuilt_voice_config: live_api_types::PrebuiltVoiceConfig {
                            voice_name: self.voice_name.clone(),
                        },
                    },
                },
            },
            output_audio_transcription: config
                .output_transcription
                .then_some(live_api_types::AudioTranscriptionConfig {}),
        })
    }
}

#[async_trait]
impl AgentBoundary for GeminiLiveBoundary {
    async fn open_session(&self, config: &SessionConfig) -> Result<AgentSession> {
        let (live_stream, _) = connect_async(self.endpoint())
            .await
            .context("failed to connect to the Gemini Live endpoint")?;
        info!(session_id = %config.session_id, "connected to Gemini Live");

        let (mut live_tx, live_rx) = live_stream.split();
        let setup = self.setup_message(config);
        live_tx
            .send(WsMessage::Text(serde_json::to_string(&setup)?.into()))
            .await
            .context("failed to send Gemini Live setup message")?;

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (requests, requests_rx) = RequestSink::new();
        tokio::spawn(drive_session(live_tx, live_rx, requests_rx, events_tx));

        Ok(AgentSession {
            events: events_rx,
            requests,
        })
    }
}

/// Runs the per-session loop: waits for the setup handshake, then forwards
/// injected requests upstream and emits normalized events downstream until
/// either side goes away. Requests injected before setup completes simply
/// queue in the channel.
async fn drive_session(
    mut live_tx: LiveSink,
    mut live_rx: futures_util::stream::SplitStream<LiveStream>,
    mut requests: mpsc::UnboundedReceiver<AgentRequest>,
    events: mpsc::Sender<AgentEvent>,
) {
    // Phase 1: nothing is forwarded until the server acknowledges setup.
    loop {
        match live_rx.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                match serde_json::from_str::<live_api_types::ServerMessage>(&text) {
                    Ok(message) if message.setup_complete.is_some() => {
                        info!("Gemini Live session setup is complete");
                        break;
                    }
                    Ok(message) => {
                        warn!(?message, "unexpected message during Gemini Live setup");
                    }
                    Err(_) => {
                        error!("failed to parse Gemini Live message during setup: {text}");
                    }
                }
            }
            Some(Ok(WsMessage::Close(frame))) => {
                error!(?frame, "Gemini Live closed the connection during setup");
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                error!(error = %err, "error reading from Gemini Live during setup");
                return;
            }
            None => return,
        }
    }

    // Phase 2: bidirectional streaming.
    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else {
                    debug!("request sink dropped; closing Gemini Live session");
                    break;
                };
                if let Err(err) = forward_request(&mut live_tx, request).await {
                    error!(error = ?err, "failed to forward request to Gemini Live");
                    break;
                }
            }
            message = live_rx.next() => {
                match message {
                    Some(Ok(WsMessage::Text(text))) => {
                        let Ok(parsed) = serde_json::from_str::<live_api_types::ServerMessage>(&text) else {
                            warn!("unparseable Gemini Live message: {text}");
                            continue;
                        };
                        let Some(content) = parsed.server_content else { continue };
                        for event in events_from_content(content) {
                            if events.send(event).await.is_err() {
                                debug!("event stream consumer gone; closing Gemini Live session");
                                return;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        info!(?frame, "Gemini Live closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        error!(error = %err, "error reading from Gemini Live");
                        break;
                    }
                    None => break,
                }
            }
        }
    }
    // Dropping `events` here closes the relay's outbound stream, which in
    // turn tears the whole session down.
}

/// Maps one injected request to its Gemini Live message and sends it.
async fn forward_request(live_tx: &mut LiveSink, request: AgentRequest) -> Result<()> {
    let message = match request {
        AgentRequest::Content { role, text } => live_api_types::ClientMessage::ClientContent(
            live_api_types::BidiGenerateContentClientContent {
                turns: vec![live_api_types::ContentTurn {
                    role,
                    parts: vec![live_api_types::TextPart { text }],
                }],
                turn_complete: true,
            },
        ),
        AgentRequest::Realtime { mime_type, data } => live_api_types::ClientMessage::RealtimeInput(
            live_api_types::BidiGenerateContentRealtimeInput {
                audio: live_api_types::Blob {
                    mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(&data),
                },
            },
        ),
    };
    live_tx
        .send(WsMessage::Text(serde_json::to_string(&message)?.into()))
        .await?;
    Ok(())
}

/// Normalizes one `serverContent` message into agent events. Content parts
/// come first; a turn boundary, when present, is emitted last so ordering
/// toward the client is preserved.
fn events_from_content(content: live_api_types::LiveServerContent) -> Vec<AgentEvent> {
    let mut events = Vec::new();

    if let Some(transcription) = content.output_transcription {
        events.push(AgentEvent::partial_text(transcription.text));
    }

    if let Some(model_turn) = content.model_turn {
        for part in model_turn.parts {
            if let Some(text) = part.text {
                events.push(AgentEvent::partial_text(text));
            } else if let Some(blob) = part.inline_data {
                match base64::engine::general_purpose::STANDARD.decode(&blob.data) {
                    Ok(decoded) => {
                        let mime_type =
                            blob.mime_type.unwrap_or_else(|| AUDIO_PCM_MIME.to_string());
                        events.push(AgentEvent::inline_audio(mime_type, Bytes::from(decoded)));
                    }
                    Err(err) => warn!(error = %err, "dropping undecodable inline blob"),
                }
            }
        }
    }

    let turn_complete = content.turn_complete.unwrap_or(false);
    let interrupted = content.interrupted.unwrap_or(false);
    if turn_complete || interrupted {
        events.push(AgentEvent::turn_status(turn_complete, interrupted));
    }

    events
}
