use chrono::Local;
use roomie_core::{Conversation, Message, MessageType};
use roomie_messaging::{SessionPhase, SessionState};
use std::fmt::Write;

pub fn conversations(state: &SessionState) -> String {
    if state.loading_conversations {
        return "loading conversations...".to_string();
    }
    if state.conversations.is_empty() {
        return "no conversations yet".to_string();
    }

    let mut out = format!("conversations ({} unread)\n", state.total_unread);
    for (i, conversation) in state.conversations.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, conversation_line(conversation));
    }
    out
}

fn conversation_line(conversation: &Conversation) -> String {
    let mut line = conversation.other_user.name.clone();
    if let Some(room) = &conversation.room {
        if !room.title.is_empty() {
            let _ = write!(line, " | {}", room.title);
        }
        if let Some(comuna) = &room.comuna {
            let _ = write!(line, ", {}", comuna);
        }
    }
    if conversation.has_unread() {
        let _ = write!(line, " ({})", conversation.unread_count);
    }
    if let Some(last) = &conversation.last_message {
        let _ = write!(line, ": {}", preview(&last.content, last.kind));
    }
    line
}

fn preview(content: &str, kind: MessageType) -> String {
    match kind {
        MessageType::Image => "[image]".to_string(),
        MessageType::File => "[file]".to_string(),
        _ if content.chars().count() > 40 => {
            let cut: String = content.chars().take(40).collect();
            format!("{}...", cut)
        }
        _ => content.to_string(),
    }
}

pub fn messages(state: &SessionState) -> String {
    let Some(conversation) = state.selected_conversation() else {
        return "no conversation open, /list then /open <n>".to_string();
    };

    let mut out = format!("== {} ==\n", conversation.other_user.name);
    if state.phase() == SessionPhase::ConversationSelected {
        out.push_str("loading messages...\n");
        return out;
    }
    if state.has_older_messages() {
        out.push_str("   (/older for earlier messages)\n");
    }
    if state.messages.is_empty() {
        out.push_str("   no messages\n");
    }
    for message in &state.messages {
        let _ = writeln!(out, "{}", message_line(message));
    }
    out
}

fn message_line(message: &Message) -> String {
    let at = message.created_at.with_timezone(&Local).format("%d/%m %H:%M");
    let who = if message.is_mine {
        "me"
    } else {
        message.sender.name.as_str()
    };
    let body = match (message.kind, &message.attachment_url) {
        (MessageType::System, _) => return format!("[{}] * {}", at, message.content),
        (_, Some(url)) => format!("{} <{}>", message.content, url),
        _ => message.content.clone(),
    };
    format!("[{}] {}: {}", at, who, body)
}

/// Resolve `/open` input: a 1-based list position or a conversation id.
pub fn resolve_conversation(state: &SessionState, arg: &str) -> Option<String> {
    if let Ok(n) = arg.parse::<usize>() {
        if let Some(conversation) = n.checked_sub(1).and_then(|i| state.conversations.get(i)) {
            return Some(conversation.id.clone());
        }
    }
    state.conversation(arg).map(|c| c.id.clone())
}
