use futures::future::BoxFuture;

use crate::{dao::storage::StorageResult, dto::document::ChannelDocument, state::channel::Channel};

/// Abstraction over the per-channel document persistence layer.
pub trait ChannelStore: Send + Sync {
    /// Load the stored document for `channel`.
    ///
    /// Never fails: missing, empty, or malformed content is replaced by the
    /// default document, which is persisted back before being returned.
    fn load(&self, channel: Channel) -> BoxFuture<'static, ChannelDocument>;

    /// Serialize `document` and overwrite the channel's storage location.
    fn save(
        &self,
        channel: Channel,
        document: ChannelDocument,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
