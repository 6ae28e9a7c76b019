use serde::{Deserialize, Serialize};

use crate::templates::ActionDescriptor;

/// A message in a conversation: a role, text content, and optional metadata.
///
/// Messages are immutable once created; the conversation transcript is
/// append-only within a turn. Assistant messages may carry
/// [`ActionDescriptor`]s in their metadata: declarative instructions the
/// calling UI layer executes against its own store.
///
/// # Examples
///
/// ```
/// use promograph::message::Message;
///
/// let user_msg = Message::user("I want to create an ad");
/// let assistant_msg = Message::assistant("Let's get started!");
///
/// assert!(user_msg.has_role(Message::USER));
/// assert!(assistant_msg.metadata.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (e.g. "user", "assistant", "system").
    pub role: String,
    /// The text content of the message.
    pub content: String,
    /// Action descriptors and other structured payload for the UI layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

/// Structured payload attached to an assistant message.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Declarative side-effect instructions for the calling UI layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

impl Message {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// Assistant response message role.
    pub const ASSISTANT: &'static str = "assistant";
    /// System prompt or instruction message role.
    pub const SYSTEM: &'static str = "system";

    /// Creates a new message with the specified role and content.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            metadata: None,
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// Creates an assistant message carrying action descriptors.
    ///
    /// ```
    /// use promograph::message::Message;
    /// use promograph::templates::{ActionDescriptor, ActionKind};
    ///
    /// let action = ActionDescriptor::new(ActionKind::Suggestion, "showSuggestions");
    /// let msg = Message::assistant_with_actions("Here are some ideas.", vec![action]);
    /// assert_eq!(msg.actions().len(), 1);
    /// ```
    #[must_use]
    pub fn assistant_with_actions(content: &str, actions: Vec<ActionDescriptor>) -> Self {
        let mut msg = Self::assistant(content);
        if !actions.is_empty() {
            msg.metadata = Some(MessageMetadata { actions });
        }
        msg
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Returns true if this message has the specified role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// The action descriptors attached to this message, if any.
    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        self.metadata
            .as_ref()
            .map(|m| m.actions.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{ActionDescriptor, ActionKind};

    #[test]
    fn test_message_construction() {
        let msg = Message::new("user", "hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
        assert!(msg.metadata.is_none());
    }

    #[test]
    fn test_convenience_constructors() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, Message::USER);

        let assistant_msg = Message::assistant("Hi there!");
        assert_eq!(assistant_msg.role, Message::ASSISTANT);

        let system_msg = Message::system("Session started");
        assert_eq!(system_msg.role, Message::SYSTEM);
    }

    #[test]
    fn test_actions_attach_and_read_back() {
        let action = ActionDescriptor::new(ActionKind::Navigation, "navigateToPageAndPerform");
        let msg = Message::assistant_with_actions("Taking you there.", vec![action.clone()]);
        assert_eq!(msg.actions(), &[action]);

        // Empty action list attaches no metadata at all.
        let bare = Message::assistant_with_actions("Done.", vec![]);
        assert!(bare.metadata.is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let msg = Message::user("test");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("metadata"));
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }
}
