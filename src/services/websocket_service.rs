use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    state::{MemberConnection, SharedState, channel::Channel},
};

/// Handle the full lifecycle of one realtime connection.
///
/// The referrer captured at upgrade time decides channel membership. A
/// connection that cannot be routed is closed before it joins anything and
/// never receives an event.
pub async fn handle_socket(state: SharedState, socket: WebSocket, referer: String) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps fan-out messages flowing even while we await
    // inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let Some(channel) = Channel::from_referer(&referer) else {
        warn!(referer = %referer, "could not determine channel from referer; dropping connection");
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    };

    let member_id = Uuid::new_v4();
    let hub = state.hub(channel);
    hub.join(MemberConnection {
        id: member_id,
        tx: outbound_tx.clone(),
    });
    info!(member = %member_id, channel = %channel, members = hub.member_count(), "viewer joined channel");

    // New members see the current document before any further updates.
    let snapshot = hub.snapshot().await;
    if send_message(&outbound_tx, &ServerMessage::DataUpdate(snapshot)).is_err() {
        info!(member = %member_id, "connection closed during snapshot send");
        hub.leave(&member_id);
        finalize(writer_task, outbound_tx).await;
        return;
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::UpdateData(document)) => {
                    info!(member = %member_id, channel = %channel, "document updated");
                    // Replacement and fan-out happen under the channel's
                    // document lock, so every member (the sender included)
                    // sees updates in the order they were applied.
                    state.apply_update(channel, document).await;
                }
                Ok(ClientMessage::Unknown) => {
                    warn!(member = %member_id, "ignoring unknown client event");
                }
                Err(err) => {
                    warn!(member = %member_id, error = %err, "failed to parse client message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(member = %member_id, "viewer closed the connection");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(member = %member_id, error = %err, "websocket error");
                break;
            }
        }
    }

    hub.leave(&member_id);
    info!(member = %member_id, channel = %channel, "viewer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Serialize a server event into a websocket frame.
///
/// Serialization failure is a permanent error, so it is logged and the event
/// dropped rather than retried.
pub(crate) fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize server message");
            None
        }
    }
}

/// Serialize a payload and queue it on one member's writer channel.
///
/// Returns an error only when the writer has gone away, so the caller can tear
/// the connection down.
fn send_message(
    tx: &mpsc::UnboundedSender<Message>,
    message: &ServerMessage,
) -> Result<(), mpsc::error::SendError<Message>> {
    match encode(message) {
        Some(frame) => tx.send(frame),
        None => Ok(()),
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
