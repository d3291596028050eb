use serde::{Deserialize, Serialize};

/// Form body of a `POST /post_message` request.
///
/// Serialized as `application/x-www-form-urlencoded` with a single
/// `message` field holding the raw user-authored text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageParams {
    /// The text to append to the server's log.
    pub message: String,
}

impl PostMessageParams {
    /// Create a new `PostMessageParams`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
