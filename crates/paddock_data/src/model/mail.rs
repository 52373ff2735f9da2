//! Mail.

use serde::{Deserialize, Serialize};

use super::Uid;

/// Kind of mail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailType {
    /// Sent by another player.
    #[default]
    Regular,
    /// Sent by the server.
    System,
}

/// A letter between characters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mail {
    /// Mail uid.
    pub uid: Uid,
    /// Sender name.
    pub sender: String,
    /// Recipient name.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Kind of mail.
    pub mail_type: MailType,
    /// Read by the recipient.
    pub read: bool,
    /// Creation time (unix seconds).
    pub created_at: u64,
}
