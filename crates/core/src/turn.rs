//! Conversation turn model shared by the session, the oracle client and the dispatcher.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Who authored a turn in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A labeled binary payload submitted to the oracle, such as a screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Renders the payload as a `data:` URL, the form OpenAI-compatible endpoints accept.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.data)
        )
    }
}

/// The content of a single turn: plain text or a binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnContent {
    Text(String),
    Attachment(Attachment),
}

impl TurnContent {
    /// Returns the text if this is a text turn.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TurnContent::Text(text) => Some(text),
            TurnContent::Attachment(_) => None,
        }
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        TurnContent::Text(text)
    }
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        TurnContent::Text(text.to_string())
    }
}

impl From<Attachment> for TurnContent {
    fn from(attachment: Attachment) -> Self {
        TurnContent::Attachment(attachment)
    }
}

/// One entry of the ordered conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text(text.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_renders_data_url() {
        let attachment = Attachment::new("image/png", b"png".to_vec());
        assert_eq!(attachment.to_data_url(), "data:image/png;base64,cG5n");
    }

    #[test]
    fn text_turns_expose_their_text() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content.as_text(), Some("hello"));

        let image = Turn::user(Attachment::new("image/png", vec![1, 2, 3]));
        assert_eq!(image.content.as_text(), None);
    }
}
