//! # Real-time WebSocket Handler
//!
//! `GET /ws?token=<jwt>` upgrades to a WebSocket that streams the caller's
//! [`crate::realtime::RealtimeEvent`]s. The room is chosen from the verified
//! token identity; clients cannot subscribe to anyone else's events.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer JWT; browsers cannot set headers on WebSocket upgrades.
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let claims = auth::decode_token(&state.config.jwt_secret, &query.token)?;
    let user = auth::resolve_user(&state.users, &claims).await?;
    Ok(ws.on_upgrade(move |socket| session(socket, state, user.id)))
}

async fn session(socket: WebSocket, state: AppState, user_id: Uuid) {
    let mut events = state.hub.subscribe(user_id).await;
    let (mut outbound, mut inbound) = socket.split();

    tracing::debug!(user = %user_id, "websocket session opened");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to serialize realtime event");
                            continue;
                        }
                    };
                    if outbound.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user = %user_id, skipped, "websocket consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            message = inbound.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Inbound frames (pings, client chatter) are ignored.
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(user = %user_id, "websocket session closed");
}
