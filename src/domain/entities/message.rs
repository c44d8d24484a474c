use super::BotIdentity;
use chrono::{DateTime, Utc};

/// Result of the host's command parse for a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParse {
    /// The message invoked a known command.
    Resolved { name: String, args: Vec<String> },
    /// The message was flagged as a command but no command object resolved.
    Unresolved,
}

impl CommandParse {
    pub fn name(&self) -> Option<&str> {
        match self {
            CommandParse::Resolved { name, .. } => Some(name),
            CommandParse::Unresolved => None,
        }
    }
}

/// Read-only view of an inbound message as delivered to one bot connection
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: String,
    pub platform: String,
    pub self_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub guild_id: Option<String>,
    pub is_direct: bool,
    pub text: String,
    pub command: Option<CommandParse>,
    pub mentions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        platform: impl Into<String>,
        self_id: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platform: platform.into(),
            self_id: self_id.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            guild_id: None,
            is_direct: false,
            text: text.into(),
            command: None,
            mentions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn direct(mut self) -> Self {
        self.is_direct = true;
        self
    }

    pub fn with_command(mut self, name: impl Into<String>, args: Vec<String>) -> Self {
        self.command = Some(CommandParse::Resolved { name: name.into(), args });
        self
    }

    pub fn with_unresolved_command(mut self) -> Self {
        self.command = Some(CommandParse::Unresolved);
        self
    }

    pub fn with_mention(mut self, self_id: impl Into<String>) -> Self {
        self.mentions.push(self_id.into());
        self
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }

    /// The same message as seen by another bot connection on the channel.
    pub fn for_receiver(&self, identity: &BotIdentity) -> Self {
        let mut msg = self.clone();
        msg.platform = identity.platform.clone();
        msg.self_id = identity.self_id.clone();
        msg
    }

    pub fn receiver(&self) -> BotIdentity {
        BotIdentity::new(self.platform.clone(), self.self_id.clone())
    }
}
