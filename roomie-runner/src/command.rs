/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    /// 1-based position in the list, or a conversation id.
    Open(String),
    Back,
    Older,
    Send(String),
    Unread,
    Help,
    Quit,
}

pub const HELP: &str = "\
/list            show conversations
/open <n|id>     open a conversation
/back            return to the conversation list
/older           load older messages
/send <text>     send a message (plain text works too while a conversation is open)
/unread          refresh the unread total
/help            this help
/quit            exit";

/// Parse a prompt line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "list" | "l" => Command::List,
        "open" | "o" if !arg.is_empty() => Command::Open(arg.to_string()),
        "open" | "o" => return Err("usage: /open <n|id>".to_string()),
        "back" | "b" => Command::Back,
        "older" => Command::Older,
        "send" | "s" => Command::Send(arg.to_string()),
        "unread" | "u" => Command::Unread,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `/{}`, try /help", other)),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_send() {
        assert_eq!(parse("  hola  ").unwrap(), Some(Command::Send("hola".to_string())));
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse("/open 2").unwrap(), Some(Command::Open("2".to_string())));
        assert_eq!(parse("/o clx9abc").unwrap(), Some(Command::Open("clx9abc".to_string())));
        assert_eq!(parse("/send  hola que tal").unwrap(), Some(Command::Send("hola que tal".to_string())));
        assert_eq!(parse("/back").unwrap(), Some(Command::Back));
        assert_eq!(parse("/q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_bad_commands() {
        assert!(parse("/open").is_err());
        assert!(parse("/dance").is_err());
    }
}
