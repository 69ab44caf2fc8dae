pub mod error;
pub mod events;
pub mod session;
pub mod state;

pub use error::SessionError;
pub use events::SessionEvent;
pub use session::MessagingSession;
pub use state::{SessionPhase, SessionState};
