pub mod channel;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::channel_store::ChannelStore,
    dto::{document::ChannelDocument, ws::ServerMessage},
    services::{storage_writer, websocket_service},
    state::channel::Channel,
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push frames to one connected viewer.
pub struct MemberConnection {
    /// Identifier assigned at join time, used for removal on disconnect.
    pub id: Uuid,
    /// Writer channel draining into the member's socket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Live state for one broadcast channel: the current document plus every
/// connected member.
pub struct ChannelHub {
    document: RwLock<ChannelDocument>,
    members: DashMap<Uuid, MemberConnection>,
    save_tx: mpsc::UnboundedSender<ChannelDocument>,
}

impl ChannelHub {
    fn new(
        document: ChannelDocument,
        save_tx: mpsc::UnboundedSender<ChannelDocument>,
    ) -> Self {
        Self {
            document: RwLock::new(document),
            members: DashMap::new(),
            save_tx,
        }
    }

    /// Clone of the current document, served to new members on join.
    pub async fn snapshot(&self) -> ChannelDocument {
        self.document.read().await.clone()
    }

    /// Replace the document verbatim with the payload a member sent.
    ///
    /// Replacement is a single atomic step; concurrent updates are ordered by
    /// arrival and the later write wins.
    pub async fn replace(&self, document: ChannelDocument) {
        *self.document.write().await = document;
    }

    /// Replace the document, fan the frame out, and queue the durable write,
    /// all under the document lock, so members and the persistence writer
    /// observe replacements in the order they were applied.
    async fn replace_and_broadcast(
        &self,
        channel: Channel,
        document: ChannelDocument,
        frame: Option<&Message>,
    ) {
        let mut guard = self.document.write().await;
        *guard = document.clone();
        if let Some(frame) = frame {
            self.broadcast(frame);
        }
        if self.save_tx.send(document).is_err() {
            warn!(channel = %channel, "persistence writer is gone; update not persisted");
        }
    }

    /// Register a member so it receives subsequent broadcasts.
    pub fn join(&self, member: MemberConnection) {
        self.members.insert(member.id, member);
    }

    /// Remove a member on disconnect; no further frames are sent to it.
    pub fn leave(&self, id: &Uuid) {
        self.members.remove(id);
    }

    /// Number of currently joined members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Push a frame to every current member, evicting members whose writer
    /// task has already gone away.
    pub fn broadcast(&self, message: &Message) {
        self.members.retain(|id, member| {
            if member.tx.send(message.clone()).is_ok() {
                true
            } else {
                warn!(member = %id, "dropping member with closed writer");
                false
            }
        });
    }
}

/// Central application state shared by the page server and the realtime hub.
pub struct AppState {
    config: AppConfig,
    rematch: ChannelHub,
    finals: ChannelHub,
}

impl AppState {
    /// Build shared state with both channels seeded from the store.
    ///
    /// Loading self-heals missing or unreadable storage, so every channel has
    /// a defined document from this point on. Each channel gets its own
    /// persistence writer; the store handle is owned by those writers.
    pub async fn new(config: AppConfig, store: Arc<dyn ChannelStore>) -> SharedState {
        let rematch = ChannelHub::new(
            store.load(Channel::Rematch).await,
            storage_writer::spawn(Arc::clone(&store), Channel::Rematch),
        );
        let finals = ChannelHub::new(
            store.load(Channel::Finals).await,
            storage_writer::spawn(store, Channel::Finals),
        );
        Arc::new(Self {
            config,
            rematch,
            finals,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Hub for the given channel.
    pub fn hub(&self, channel: Channel) -> &ChannelHub {
        match channel {
            Channel::Rematch => &self.rematch,
            Channel::Finals => &self.finals,
        }
    }

    /// Replace a channel's document, fan it out to every member (the sender
    /// included), and queue the durable write.
    ///
    /// The write is queued on the channel's persistence writer, so storage
    /// receives updates in the same order memory does while the broadcast
    /// never waits on durability. A crash loses at most the most recent
    /// update.
    pub async fn apply_update(&self, channel: Channel, document: ChannelDocument) {
        let hub = self.hub(channel);
        let frame = websocket_service::encode(&ServerMessage::DataUpdate(document.clone()));
        hub.replace_and_broadcast(channel, document, frame.as_ref())
            .await;
    }
}
