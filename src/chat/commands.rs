//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the client and is never posted.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display sync and submission statistics.
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be posted as a chat message.
///
/// # Examples
///
/// ```
/// # use webchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("hello everyone").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match (command.as_str(), argument) {
        ("help" | "?", None) => ChatCommand::Help,
        ("quit" | "exit" | "q", None) => ChatCommand::Quit,
        ("stats" | "status", None) => ChatCommand::Stats,
        ("help" | "?" | "quit" | "exit" | "q" | "stats" | "status", Some(_)) => {
            ChatCommand::Invalid(format!("/{command} takes no arguments"))
        }
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns the help text for available commands.
pub fn help_text() -> &'static str {
    r#"Commands:
  /help, /?          Show this help message
  /stats, /status    Show sync and submission statistics
  /quit, /exit, /q   Exit the chat

Anything else is posted to the server. Your message appears once the
next poll sees it."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_messages_are_not_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("see http://x.co/path"), None);
    }

    #[test]
    fn known_commands() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /q  "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
    }

    #[test]
    fn unknown_and_malformed_commands() {
        assert_eq!(
            parse_command("/nick bob"),
            Some(ChatCommand::Invalid("Unknown command: /nick".to_string()))
        );
        assert_eq!(
            parse_command("/quit now"),
            Some(ChatCommand::Invalid("/quit takes no arguments".to_string()))
        );
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        assert!(help.contains("/help"));
        assert!(help.contains("/stats"));
        assert!(help.contains("/quit"));
    }
}
