use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    System,
}

/// Participant as embedded in conversations and messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Room (and its property) the match was made on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub comuna: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: MessageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub match_id: String,
    pub other_user: UserSummary,
    #[serde(default)]
    pub room: Option<RoomSummary>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Only an explicit mark-read may bring the count back down.
    pub fn clear_unread(&mut self) {
        self.unread_count = 0;
    }

    /// Patch the preview fields in place after a message was sent.
    pub fn record_message(&mut self, message: &Message) {
        self.last_message = Some(LastMessage {
            content: message.content.clone(),
            created_at: message.created_at,
            kind: message.kind,
        });
        self.last_message_at = Some(message.created_at);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    pub content: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub sender: UserSummary,
    #[serde(default)]
    pub is_mine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Body of `POST /messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub conversation_id: String,
    pub content: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attachment_url: Option<String>,
}

impl SendMessage {
    /// Plain text message; the server defaults the type to TEXT.
    pub fn text(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        SendMessage {
            conversation_id: conversation_id.into(),
            content: content.into(),
            kind: None,
            attachment_url: None,
        }
    }

    pub fn with_attachment(mut self, kind: MessageType, url: impl Into<String>) -> Self {
        self.kind = Some(kind);
        self.attachment_url = Some(url.into());
        self
    }
}

/// Acknowledgement of `POST /messages/conversations/{id}/read`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// `GET /messages/unread` answers either with a bare number or an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UnreadCount {
    Bare(u64),
    Object {
        #[serde(alias = "unreadCount", alias = "total")]
        count: u64,
    },
}

impl UnreadCount {
    pub fn total(self) -> u64 {
        match self {
            UnreadCount::Bare(n) => n,
            UnreadCount::Object { count } => count,
        }
    }
}
