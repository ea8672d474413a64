//! Per-channel persistence writer that serializes durable writes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    dao::channel_store::ChannelStore, dto::document::ChannelDocument, state::channel::Channel,
};

/// Spawn the writer task for one channel and hand back its queue.
///
/// A single consumer drains the queue, so durable writes land in arrival
/// order and never race on the channel's file. A backlog is coalesced down to
/// the newest document; intermediate states never need to reach disk. Write
/// failures are logged and swallowed, the in-memory document stays
/// authoritative.
pub fn spawn(
    store: Arc<dyn ChannelStore>,
    channel: Channel,
) -> mpsc::UnboundedSender<ChannelDocument> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ChannelDocument>();

    tokio::spawn(async move {
        while let Some(mut document) = rx.recv().await {
            while let Ok(newer) = rx.try_recv() {
                document = newer;
            }
            if let Err(err) = store.save(channel, document).await {
                warn!(channel = %channel, error = %err, "failed to persist channel document");
            }
        }
    });

    tx
}
