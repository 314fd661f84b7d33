mod game;
pub mod handlers;
mod lobby;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::ConnectionId;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let connection: ConnectionId = ulid::Ulid::new().to_string();

    tracing::info!("WebSocket connected: {}", connection);

    // Subscribe before the welcome so nothing sent in between is missed
    let mut outbound_rx = state.subscribe();

    let welcome = ServerMessage::Welcome {
        connection_id: connection.clone(),
        stage: state.session.lock().await.stage,
        server_now: chrono::Utc::now().to_rfc3339(),
    };

    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Ok(outbound) => {
                        let Some((msg, close)) = outbound.for_connection(&connection) else {
                            continue;
                        };
                        if let Ok(json) = serde_json::to_string(msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        if close {
                            tracing::info!("Closing connection {} on request", connection);
                            let _ = sender.send(Message::Close(None)).await;
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // The next full projection brings this client up to date
                        tracing::warn!("Connection {} lagged, skipped {} messages", connection, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", connection, text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(&connection, client_msg, &state).await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            tracing::error!("Failed to send response");
                                            break;
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                // Malformed input gets no answer
                                tracing::warn!("Failed to parse client message: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    handlers::handle_disconnect(&connection, &state).await;
    tracing::info!("WebSocket connection closed: {}", connection);
}
