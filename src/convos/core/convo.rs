//! Convo record and draft types.

use serde::{Deserialize, Serialize};

use crate::convos::core::ids::{ConvoId, UserId};

/// A stored message, either a thread root or a reply.
///
/// `read` is not a column of the convo; it is derived per requesting user
/// from the `read_status` relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convo {
    /// Storage-assigned identifier.
    pub id: ConvoId,
    /// Thread root id. Equals `id` for a root.
    pub parent: ConvoId,
    /// Author.
    pub sender: UserId,
    /// Addressee.
    pub recipient: UserId,
    /// Thread subject, shared by every convo of the thread.
    pub subject: String,
    /// Message text.
    pub body: String,
    /// Whether the requesting user has read this convo.
    pub read: bool,
    /// Replies, when the thread has been assembled.
    #[serde(rename = "replies", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Convo>>,
}

impl Convo {
    /// True when this convo starts its own thread.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent == self.id
    }
}

/// Inbound draft for a new convo.
///
/// `sender` is accepted for wire compatibility but the acting user always
/// becomes the sender. A zero `parent` starts a new thread.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewConvo {
    /// Ignored; replaced by the acting user.
    pub sender: UserId,
    /// Addressee.
    pub recipient: UserId,
    /// Thread id to reply to, or zero for a new thread.
    pub parent: ConvoId,
    /// Subject for a new thread. Replies inherit the root's subject.
    pub subject: String,
    /// Message text.
    pub body: String,
}

impl NewConvo {
    /// Create a draft for a new thread.
    #[must_use]
    pub fn new(recipient: UserId, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient,
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Turn the draft into a reply to `parent`.
    #[must_use]
    pub const fn in_reply_to(mut self, parent: ConvoId) -> Self {
        self.parent = parent;
        self
    }

    /// True when the draft starts a new thread.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_omitted_until_assembled() {
        let convo = Convo {
            id: ConvoId::new(1),
            parent: ConvoId::new(1),
            sender: UserId::new(1),
            recipient: UserId::new(2),
            subject: "First Post".to_string(),
            body: "Message Body".to_string(),
            read: true,
            children: None,
        };

        let json = serde_json::to_value(&convo).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1, "parent": 1, "sender": 1, "recipient": 2,
                "subject": "First Post", "body": "Message Body", "read": true
            })
        );
        assert!(convo.is_root());
    }

    #[test]
    fn test_draft_defaults_missing_fields() {
        let raw = r#"{"recipient": 2, "subject": "Hi", "body": "there"}"#;
        let draft: NewConvo = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.sender, UserId::ANONYMOUS);
        assert!(draft.is_root());

        let reply = draft.in_reply_to(ConvoId::new(5));
        assert!(!reply.is_root());
    }
}
