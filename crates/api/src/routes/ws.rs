//! Realtime websocket endpoint.
//!
//! Every connection receives the broadcast room. Connections that present a
//! valid token (`?token=`) also join the per-user room of the account the
//! token belongs to. Events go out as JSON text frames.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::services::Envelope;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /api/v1/ws
pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    // An invalid token downgrades to an anonymous connection instead of
    // rejecting the upgrade; the client still gets broadcast events.
    let user_id: Option<Uuid> = query
        .token
        .as_deref()
        .and_then(|t| state.jwt.decode(t).ok())
        .and_then(|claims| claims.user_id().ok());

    ws.on_upgrade(move |socket| handle(socket, state, user_id))
}

async fn handle(mut socket: WebSocket, state: AppState, user_id: Option<Uuid>) {
    let mut global = state.hub.subscribe();
    let mut user_rx = match user_id {
        Some(id) => Some(state.hub.subscribe_user(id).await),
        None => None,
    };
    debug!(?user_id, "websocket connected");

    loop {
        tokio::select! {
            event = global.recv() => {
                if !forward(&mut socket, event).await {
                    break;
                }
            }
            event = next_user_event(&mut user_rx) => {
                if !forward(&mut socket, event).await {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Pings are answered by the protocol layer; client text
                    // frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    debug!(?user_id, "websocket disconnected");
}

/// Pends forever when the connection has no user room.
async fn next_user_event(rx: &mut Option<Receiver<Envelope>>) -> Result<Envelope, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Sends one envelope; returns false when the connection should close. A
/// lagged receiver skips ahead rather than dropping the connection.
async fn forward(socket: &mut WebSocket, event: Result<Envelope, RecvError>) -> bool {
    match event {
        Ok(envelope) => match serde_json::to_string(&envelope) {
            Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
            Err(_) => true,
        },
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "websocket receiver lagged");
            true
        }
        Err(RecvError::Closed) => false,
    }
}
