use tokio::sync::mpsc::UnboundedSender;

/// Side effects the view layer has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ScrollToBottom,
    /// A send failed; shown to the user as a blocking alert.
    SendFailed(String),
    UnreadTotalChanged(u64),
    ConversationRead(String),
}

#[derive(Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<UnboundedSender<SessionEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<SessionEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.tx {
            // receiver gone means nobody renders anymore
            let _ = tx.send(event);
        }
    }
}
