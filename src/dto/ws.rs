use serde::{Deserialize, Serialize};

use crate::dto::document::ChannelDocument;

#[derive(Debug, Deserialize)]
/// Events accepted from control and overlay WebSocket clients.
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Full replacement of the channel document.
    #[serde(rename = "update-data")]
    UpdateData(ChannelDocument),
    /// Any event name the server does not understand; ignored.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize)]
/// Events pushed to every member of a channel.
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Current channel document, sent once on join and after every accepted
    /// update from any channel member.
    #[serde(rename = "data-update")]
    DataUpdate(ChannelDocument),
}
