pub mod config;
pub mod types;

pub use config::{ApiConfig, Config, ConfigError, SessionConfig};
pub use types::{
    Conversation, LastMessage, Message, MessageType, Paginated, ReadAck, RoomSummary,
    SendMessage, UnreadCount, UserSummary,
};
