pub mod error;
pub mod service;

pub use error::ApiError;
pub use service::{MessageApi, MessageService};
