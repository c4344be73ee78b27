use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use rently_types::events::LiveEvent;
use tracing::{info, warn};

use crate::hub::Hub;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Drive one authenticated WebSocket connection. The JWT was already
/// verified at the HTTP upgrade, so the hub only ever sees a trusted
/// user id — the client cannot claim an identity over the socket.
pub async fn serve(socket: WebSocket, hub: Hub, user_id: i64) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut events) = hub.register(user_id);

    info!(user_id, %conn_id, "connected to gateway");

    let ready = LiveEvent::Ready { user_id };
    if sender
        .send(Message::Text(serde_json::to_string(&ready).unwrap().into()))
        .await
        .is_err()
    {
        hub.deregister(user_id, conn_id);
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut pong_received = true;
    let mut missed_heartbeats: u8 = 0;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    // A newer connection for this user superseded us.
                    info!(user_id, %conn_id, "session superseded, closing");
                    break;
                };
                let text = serde_json::to_string(&event).unwrap();
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Pong(_))) => pong_received = true,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // clients only listen on this stream
                    Some(Err(e)) => {
                        warn!(user_id, "websocket error: {}", e);
                        break;
                    }
                }
            }
            _ = heartbeat.tick() => {
                if pong_received {
                    missed_heartbeats = 0;
                } else {
                    missed_heartbeats += 1;
                    if missed_heartbeats >= 2 {
                        warn!(user_id, "heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                        break;
                    }
                }
                pong_received = false;
                if sender.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Idempotent, and a no-op if a newer connection owns the slot.
    hub.deregister(user_id, conn_id);
    info!(user_id, %conn_id, "disconnected from gateway");
}
