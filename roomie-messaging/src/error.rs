use roomie_client::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unknown conversation `{0}`")]
    UnknownConversation(String),

    #[error("no conversation selected")]
    NoConversationSelected,
}
