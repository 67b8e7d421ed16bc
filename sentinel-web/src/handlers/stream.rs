use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::info;

use crate::AppState;

/// WebSocket endpoint for the live telemetry stream. Subscribers are
/// unauthenticated; a client that stops receiving simply reconnects.
pub async fn stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let client = state.registry.register().await;
    let client_id = client.id;
    let mut updates = client.rx;
    let (mut sender, mut receiver) = socket.split();

    tokio::select! {
        // Forward the subscriber's queue to the socket (server to client)
        _ = async {
            while let Some(payload) = updates.recv().await {
                if sender.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
        } => {}

        // Inbound frames are ignored; the stream is output-only. This arm
        // only terminates the session on disconnect.
        _ = async {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Close(_)) => break,
                    Err(_) => break,
                    _ => {}
                }
            }
        } => {}
    }

    state.registry.unregister(client_id).await;
    info!(client_id = %client_id, "Stream session ended");
}
