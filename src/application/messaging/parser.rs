//! Message parser - Resolves commands in raw message text

use std::collections::BTreeSet;
use crate::domain::entities::{CommandParse, IncomingMessage};

/// Detects command invocations in incoming message text
pub struct MessageParser {
    prefixes: Vec<String>,
    known_commands: BTreeSet<String>,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
            known_commands: BTreeSet::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Restrict resolution to registered command names. Prefixed text naming
    /// an unknown command is then treated as plain text.
    pub fn with_commands<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_commands.extend(names.into_iter().map(Into::into));
        self
    }

    /// Fill in the command parse of a message unless the host already did.
    pub fn parse(&self, mut message: IncomingMessage) -> IncomingMessage {
        if message.command.is_none() {
            message.command = self.parse_command(&message.text);
        }
        message
    }

    pub fn parse_command(&self, text: &str) -> Option<CommandParse> {
        let body = strip_leading_mentions(text);
        let rest = self
            .prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| body.strip_prefix(p.as_str()))?;

        let mut parts = rest.split_whitespace();
        let Some(name) = parts.next() else {
            return Some(CommandParse::Unresolved);
        };

        if !self.known_commands.is_empty() && !self.known_commands.contains(name) {
            return None;
        }

        Some(CommandParse::Resolved {
            name: name.to_string(),
            args: parts.map(|s| s.to_string()).collect(),
        })
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Drops `<at .../>` elements and whitespace at the start of the text.
fn strip_leading_mentions(text: &str) -> &str {
    let mut rest = text.trim_start();
    while rest.starts_with("<at ") || rest.starts_with("<at>") {
        let Some(end) = rest.find('>') else { break };
        rest = rest[end + 1..].trim_start();
        if let Some(after) = rest.strip_prefix("</at>") {
            rest = after.trim_start();
        }
    }
    rest
}
