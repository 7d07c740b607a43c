//! Slash-command parsing over message text.

use crate::types::Message;

/// Splits `text` into `(command, arguments)`.
///
/// Only text starting with `/` is a command. The command runs up to the first
/// space and loses any `@botname` suffix; the arguments are everything after
/// that first space, untrimmed. Anything else yields two empty strings.
pub fn parse_command(text: &str) -> (&str, &str) {
    let Some(rest) = text.strip_prefix('/') else {
        return ("", "");
    };

    let (token, arguments) = match rest.split_once(' ') {
        Some((token, arguments)) => (token, arguments),
        None => (rest, ""),
    };

    (strip_bot_mention(token), arguments)
}

fn strip_bot_mention(token: &str) -> &str {
    match token.split_once('@') {
        Some((command, _)) => command,
        None => token,
    }
}

impl Message {
    pub fn command(&self) -> &str {
        parse_command(&self.text).0
    }

    pub fn command_arguments(&self) -> &str {
        parse_command(&self.text).1
    }
}
