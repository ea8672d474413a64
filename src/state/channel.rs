use std::fmt;

/// One of the two independent broadcast channels served by the hub.
///
/// Each channel carries its own document and its own set of connected viewers;
/// there is no cross-channel interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The rematch scoreboard.
    Rematch,
    /// The finals scoreboard.
    Finals,
}

impl Channel {
    /// Resolve channel membership from the page that opened the connection.
    ///
    /// Returns `None` when the referrer names neither page pair; such a
    /// connection cannot be routed and is dropped by the caller.
    pub fn from_referer(referer: &str) -> Option<Self> {
        if referer.contains("/rematch-") {
            Some(Channel::Rematch)
        } else if referer.contains("/finals-") {
            Some(Channel::Finals)
        } else {
            None
        }
    }

    /// Stable name used in logs and storage file names.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Rematch => "rematch",
            Channel::Finals => "finals",
        }
    }

    /// File name of the persisted document for this channel.
    pub fn data_file_name(self) -> String {
        format!("{}-data.json", self.name())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
