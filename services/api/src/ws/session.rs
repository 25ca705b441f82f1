//! Manages the WebSocket relay lifecycle for one agent session.
//!
//! One connection drives two tasks: the outbound pump (agent events to
//! client frames) and the inbound pump (client frames into the agent).
//! The first to finish ends the session; the survivor is cancelled at its
//! next suspension point and exactly one cleanup path runs.

use crate::{
    state::AppState,
    ws::{
        inbound::{self, Dispatcher},
        outbound,
    },
};
use anyhow::Result;
use axum::{
    extract::{
        Path, Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::StreamExt;
use healthbridge_core::agent::SessionConfig;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{Instrument, error, info, instrument, warn};

#[derive(Deserialize, Debug)]
pub struct WsParams {
    /// Whether the agent should answer with audio instead of text.
    #[serde(default)]
    pub is_audio: bool,
}

/// Axum handler to upgrade `GET /ws/{session_id}` to a relay session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, params.is_audio))
}

/// Entry point for one accepted connection: registers the session, runs the
/// relay, and tears everything down once regardless of how the relay ended.
#[instrument(name = "ws_session", skip(socket, state))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session_id: String, is_audio: bool) {
    info!("client connected");

    if let Err(err) = state.sessions.create(&session_id, is_audio) {
        warn!(error = %err, "refusing connection");
        return;
    }

    if let Err(err) = run_relay(socket, &state, &session_id, is_audio).await {
        error!(error = ?err, "relay session terminated with error");
    }

    state.sessions.destroy(&session_id);
    info!("session cleaned up");
}

/// Opens the agent session and drives the two directional pumps until one of
/// them finishes.
async fn run_relay(
    socket: WebSocket,
    state: &Arc<AppState>,
    session_id: &str,
    is_audio: bool,
) -> Result<()> {
    let config = SessionConfig::new(session_id, is_audio);
    let session = state.agent.open_session(&config).await?;
    info!("agent session opened");

    // The outbound task is the only socket writer, the inbound task the only
    // reader, so the two directions never contend on the transport.
    let (socket_tx, socket_rx) = socket.split();
    let dispatcher = Dispatcher::new(session.requests, state.extractor.clone());

    let mut outbound_task =
        tokio::spawn(outbound::pump(session.events, socket_tx).in_current_span());
    let mut inbound_task = tokio::spawn(inbound::pump(socket_rx, dispatcher).in_current_span());

    // First task to finish wins; the survivor is cancelled cooperatively and
    // its cancellation is an expected outcome, not a failure.
    let outbound_finished_first = tokio::select! {
        result = &mut outbound_task => {
            log_task_exit("outbound", result);
            true
        }
        result = &mut inbound_task => {
            log_task_exit("inbound", result);
            false
        }
    };
    let (survivor, survivor_task) = if outbound_finished_first {
        ("inbound", &mut inbound_task)
    } else {
        ("outbound", &mut outbound_task)
    };

    survivor_task.abort();
    match survivor_task.await {
        Err(join_err) if join_err.is_cancelled() => {}
        other => log_task_exit(survivor, other),
    }
    Ok(())
}

fn log_task_exit(direction: &str, result: Result<Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => info!(direction, "relay task finished"),
        Ok(Err(err)) => error!(direction, error = ?err, "relay task failed"),
        Err(err) => error!(direction, error = ?err, "relay task panicked"),
    }
}
