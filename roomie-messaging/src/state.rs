use roomie_core::{Conversation, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoConversationSelected,
    /// Selected, first page of messages still in flight.
    ConversationSelected,
    ConversationLoaded,
}

/// View state of the messaging screen.
///
/// Everything here mirrors server-owned records and is thrown away on
/// deselect; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub conversations: Vec<Conversation>,
    pub selected: Option<String>,
    pub messages: Vec<Message>,
    pub loaded_page: u32,
    pub total_pages: u32,
    pub loading_conversations: bool,
    pub loading_messages: bool,
    pub loading_older: bool,
    pub sending: bool,
    pub draft: String,
    pub total_unread: u64,
    pub(crate) generation: u64,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match (&self.selected, self.loading_messages) {
            (None, _) => SessionPhase::NoConversationSelected,
            (Some(_), true) => SessionPhase::ConversationSelected,
            (Some(_), false) => SessionPhase::ConversationLoaded,
        }
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn selected_conversation(&self) -> Option<&Conversation> {
        self.selected.as_deref().and_then(|id| self.conversation(id))
    }

    pub fn has_older_messages(&self) -> bool {
        self.selected.is_some() && self.loaded_page < self.total_pages
    }

    pub(crate) fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// True while `generation` still names the selection that issued a request.
    pub(crate) fn is_current(&self, conversation_id: &str, generation: u64) -> bool {
        self.generation == generation && self.selected.as_deref() == Some(conversation_id)
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
        self.messages.clear();
        self.loaded_page = 0;
        self.total_pages = 0;
        self.loading_messages = false;
        self.loading_older = false;
        self.generation += 1;
    }
}
