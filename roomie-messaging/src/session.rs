use roomie_client::MessageApi;
use roomie_core::{Message, SendMessage, SessionConfig};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing;

use crate::error::SessionError;
use crate::events::{EventSink, SessionEvent};
use crate::state::SessionState;

/// Drives the messaging screen: conversation list, selection, message list,
/// read state and sending.
///
/// The state lock is never held across a request, so actions issued from
/// different tasks interleave freely. A message fetch only lands if the
/// selection that issued it is still current; otherwise it is dropped.
pub struct MessagingSession<A> {
    api: Arc<A>,
    state: Arc<Mutex<SessionState>>,
    events: EventSink,
    page_limit: u32,
}

impl<A> Clone for MessagingSession<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            events: self.events.clone(),
            page_limit: self.page_limit,
        }
    }
}

impl<A: MessageApi> MessagingSession<A> {
    pub fn new(api: Arc<A>, config: &SessionConfig) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(SessionState::default())),
            events: EventSink::default(),
            page_limit: config.page_limit,
        }
    }

    pub fn with_events(mut self, tx: UnboundedSender<SessionEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn set_draft(&self, draft: impl Into<String>) {
        self.state.lock().await.draft = draft.into();
    }

    /// Initial load of the conversation list plus the unread total.
    pub async fn load_conversations(&self) {
        self.state.lock().await.loading_conversations = true;

        let result = self.api.list_conversations().await;

        {
            let mut state = self.state.lock().await;
            state.loading_conversations = false;
            match result {
                Ok(conversations) => {
                    tracing::info!("Loaded {} conversations", conversations.len());
                    state.conversations = conversations;
                }
                Err(e) => {
                    tracing::warn!("Failed to load conversations: {}", e);
                }
            }
        }

        self.refresh_unread_total().await;
    }

    pub async fn refresh_unread_total(&self) {
        match self.api.unread_count().await {
            Ok(total) => {
                let mut state = self.state.lock().await;
                if state.total_unread != total {
                    state.total_unread = total;
                    self.events.emit(SessionEvent::UnreadTotalChanged(total));
                }
            }
            Err(e) => {
                tracing::warn!("Failed to refresh unread total: {}", e);
            }
        }
    }

    /// Open a conversation: fetch its first page and, if it has unread
    /// messages, mark it read.
    ///
    /// Fetch and mark-read failures are logged and leave the view idle.
    pub async fn select(&self, conversation_id: &str) -> Result<(), SessionError> {
        let (generation, had_unread) = {
            let mut state = self.state.lock().await;
            let had_unread = state
                .conversation(conversation_id)
                .map(|c| c.has_unread())
                .ok_or_else(|| SessionError::UnknownConversation(conversation_id.to_string()))?;

            state.clear_selection();
            state.selected = Some(conversation_id.to_string());
            state.loading_messages = true;
            (state.generation, had_unread)
        };

        tracing::debug!("Selected conversation {}", conversation_id);

        let result = self
            .api
            .list_messages(conversation_id, Some(1), Some(self.page_limit))
            .await;

        {
            let mut state = self.state.lock().await;
            if state.is_current(conversation_id, generation) {
                state.loading_messages = false;
                match result {
                    Ok(page) => {
                        state.loaded_page = page.page;
                        state.total_pages = page.total_pages;
                        state.messages = page.items;
                        self.events.emit(SessionEvent::ScrollToBottom);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load messages for {}: {}", conversation_id, e);
                    }
                }
            } else {
                tracing::debug!("Dropping stale message page for {}", conversation_id);
            }
        }

        if had_unread {
            self.mark_read(conversation_id).await;
        }

        Ok(())
    }

    async fn mark_read(&self, conversation_id: &str) {
        if let Err(e) = self.api.mark_read(conversation_id).await {
            tracing::warn!("Failed to mark {} as read: {}", conversation_id, e);
            return;
        }

        {
            let mut state = self.state.lock().await;
            if let Some(conversation) = state.conversation_mut(conversation_id) {
                conversation.clear_unread();
            }
        }
        self.events
            .emit(SessionEvent::ConversationRead(conversation_id.to_string()));

        self.refresh_unread_total().await;
    }

    /// Back to the conversation list. Loaded messages are discarded.
    pub async fn deselect(&self) {
        self.state.lock().await.clear_selection();
    }

    /// Fetch the next (older) page of the open conversation and prepend it.
    ///
    /// Returns whether anything was loaded.
    pub async fn load_older(&self) -> bool {
        let (conversation_id, next_page, generation) = {
            let mut state = self.state.lock().await;
            if state.loading_messages || state.loading_older || !state.has_older_messages() {
                return false;
            }
            let Some(id) = state.selected.clone() else {
                return false;
            };
            state.loading_older = true;
            (id, state.loaded_page + 1, state.generation)
        };

        let result = self
            .api
            .list_messages(&conversation_id, Some(next_page), Some(self.page_limit))
            .await;

        let mut state = self.state.lock().await;
        if !state.is_current(&conversation_id, generation) {
            return false;
        }
        state.loading_older = false;

        match result {
            Ok(page) => {
                let known: HashSet<&str> = state.messages.iter().map(|m| m.id.as_str()).collect();
                let mut older: Vec<Message> = page
                    .items
                    .into_iter()
                    .filter(|m| !known.contains(m.id.as_str()))
                    .collect();
                let loaded = !older.is_empty();

                older.append(&mut state.messages);
                state.messages = older;
                state.loaded_page = page.page;
                state.total_pages = page.total_pages;
                loaded
            }
            Err(e) => {
                tracing::warn!("Failed to load older messages for {}: {}", conversation_id, e);
                false
            }
        }
    }

    /// Send the current draft.
    ///
    /// The draft is cleared on success unless it was edited while the send
    /// was in flight.
    pub async fn send_draft(&self) -> Result<Option<Message>, SessionError> {
        let draft = self.state.lock().await.draft.clone();
        let sent = self.send(&draft).await?;
        if sent.is_some() {
            let mut state = self.state.lock().await;
            if state.draft == draft {
                state.draft.clear();
            }
        }
        Ok(sent)
    }

    /// Send a text message to the open conversation.
    ///
    /// Blank content, a send already in flight, or a first page still
    /// loading is a no-op returning `Ok(None)` without touching the network.
    /// On success the message is appended and the conversation preview is
    /// patched in place.
    pub async fn send(&self, content: &str) -> Result<Option<Message>, SessionError> {
        let content = content.trim();
        let (conversation_id, generation) = {
            let mut state = self.state.lock().await;
            if content.is_empty() || state.sending || state.loading_messages {
                return Ok(None);
            }
            let id = state
                .selected
                .clone()
                .ok_or(SessionError::NoConversationSelected)?;
            state.sending = true;
            (id, state.generation)
        };

        let result = self
            .api
            .send_message(&SendMessage::text(conversation_id.as_str(), content))
            .await;

        let mut state = self.state.lock().await;
        state.sending = false;

        match result {
            Ok(mut message) => {
                message.is_mine = true;
                if let Some(conversation) = state.conversation_mut(&conversation_id) {
                    conversation.record_message(&message);
                }
                if state.is_current(&conversation_id, generation) {
                    state.messages.push(message.clone());
                    self.events.emit(SessionEvent::ScrollToBottom);
                }
                Ok(Some(message))
            }
            Err(e) => {
                tracing::warn!("Failed to send message to {}: {}", conversation_id, e);
                self.events.emit(SessionEvent::SendFailed(e.to_string()));
                Err(e.into())
            }
        }
    }
}
