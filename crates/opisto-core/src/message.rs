//! Internal messages with multi-recipient fan-out and reply threading.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message. Written once; recipients are tracked in separate
/// [`MessageRecipient`] rows so one message can fan out to many readers.
///
/// `responds_to` threads replies: it points at the message being answered,
/// or is `None` for a top-level message. Deleting a message does not touch
/// messages that reply to it, so a reply can outlive its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message_id:  Uuid,
  pub title:       String,
  pub contents:    String,
  pub sender_id:   Uuid,
  pub responds_to: Option<Uuid>,
}

/// One (message, recipient) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecipient {
  pub recipient_id: Uuid,
  pub message_id:   Uuid,
  pub user_id:      Uuid,
}

/// Input to [`crate::store::SchoolStore::send_message`].
///
/// The store writes exactly one recipient row per entry in `recipients`,
/// as given. Callers that want the sender to be able to read their own sent
/// message go through [`NewMessage::including_sender`].
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub sender_id:   Uuid,
  pub recipients:  Vec<Uuid>,
  pub title:       String,
  pub contents:    String,
  pub responds_to: Option<Uuid>,
}

impl NewMessage {
  pub fn new(
    sender_id: Uuid,
    recipients: Vec<Uuid>,
    title: impl Into<String>,
    contents: impl Into<String>,
  ) -> Self {
    Self {
      sender_id,
      recipients,
      title: title.into(),
      contents: contents.into(),
      responds_to: None,
    }
  }

  /// Mark this message as a reply to `parent`.
  pub fn in_reply_to(mut self, parent: Uuid) -> Self {
    self.responds_to = Some(parent);
    self
  }

  /// Append the sender to the recipient list so the sent message shows up
  /// in the sender's own mailbox. No deduplication is performed.
  pub fn including_sender(mut self) -> Self {
    self.recipients.push(self.sender_id);
    self
  }
}
