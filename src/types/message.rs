use serde::{Deserialize, Serialize};

/// A single chat line as held by the server.
///
/// The wire format uses the server's field names (`Name`, `Message`,
/// `Timestamp`). Messages are immutable once received and have no identity
/// beyond their position in the server's list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the author.
    #[serde(rename = "Name")]
    pub sender: String,

    /// Raw, untrusted message body.
    #[serde(rename = "Message")]
    pub text: String,

    /// Server-formatted receive time, if the server sends one.
    #[serde(
        rename = "Timestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

impl Message {
    /// Create a new `Message` without a timestamp.
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp: None,
        }
    }

    /// Attach a server timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}
