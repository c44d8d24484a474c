//! Event replay - feeds JSON-lines host events through the in-memory host
//!
//! One event per line, tagged by `type`:
//!
//! ```text
//! {"type":"login-added","bot":"onebot:10001"}
//! {"type":"attach","channel":"c1","bot":"onebot:10001"}
//! {"type":"message","platform":"onebot","channel":"c1","user":"u1","text":"need help"}
//! {"type":"ready"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::host::InMemoryHost;
use crate::application::arbitration::Outcome;
use crate::application::errors::ReplayError;
use crate::domain::entities::{BotIdentity, IncomingMessage};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    LoginAdded { bot: String },
    Logout { bot: String },
    Attach { channel: String, bot: String },
    Message(MessageEvent),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessageEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub platform: String,
    #[serde(default)]
    pub self_id: String,
    pub channel: String,
    pub user: String,
    #[serde(default)]
    pub guild: Option<String>,
    #[serde(default)]
    pub direct: bool,
    #[serde(default)]
    pub text: String,
    /// Command already parsed by the host. An empty name marks a command
    /// that could not be resolved.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

impl MessageEvent {
    pub fn into_message(self) -> IncomingMessage {
        let mut message = IncomingMessage::new(self.platform, self.self_id, self.channel, self.user, self.text);
        if let Some(id) = self.id {
            message = message.with_id(id);
        }
        if let Some(guild) = self.guild {
            message = message.with_guild(guild);
        }
        if self.direct {
            message = message.direct();
        }
        message = match self.command {
            Some(name) if name.is_empty() => message.with_unresolved_command(),
            Some(name) => message.with_command(name, Vec::new()),
            None => message,
        };
        message.mentions = self.mentions;
        message
    }
}

/// Asynchronous source of host events
#[async_trait]
pub trait EventSource: Send {
    /// Next event with its line number, or `None` at end of input.
    async fn next_event(&mut self) -> Result<Option<(usize, HostEvent)>, ReplayError>;
}

/// Reads JSON-lines events from any async reader
pub struct LineSource<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
}

impl<R: AsyncRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> EventSource for LineSource<R> {
    async fn next_event(&mut self) -> Result<Option<(usize, HostEvent)>, ReplayError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(trimmed).map_err(|e| ReplayError::Malformed {
                line: self.line_no,
                reason: e.to_string(),
            })?;
            return Ok(Some((self.line_no, event)));
        }
        Ok(None)
    }
}

/// Arbitration result for one replayed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub line: usize,
    pub message_id: String,
    pub channel: String,
    pub outcome: Outcome,
    pub assignee: String,
}

fn identity(line: usize, raw: &str) -> Result<BotIdentity, ReplayError> {
    raw.parse().map_err(|reason| ReplayError::Malformed { line, reason })
}

/// Drive `host` with every event of `source`, strictly in order.
pub async fn replay<S>(source: &mut S, host: &mut InMemoryHost) -> Result<Vec<ReplayStep>, ReplayError>
where
    S: EventSource + ?Sized,
{
    let mut steps = Vec::new();
    while let Some((line, event)) = source.next_event().await? {
        match event {
            HostEvent::LoginAdded { bot } => {
                host.login(identity(line, &bot)?);
            }
            HostEvent::Logout { bot } => host.logout(&identity(line, &bot)?),
            HostEvent::Attach { channel, bot } => host.attach(&channel, identity(line, &bot)?)?,
            HostEvent::Ready => {
                host.ready();
            }
            HostEvent::Message(event) => {
                let message = event.into_message();
                let message_id = message.id.clone();
                let platform = message.platform.clone();
                let channel = message.channel_id.clone();
                let outcome = host.receive(message)?;
                let assignee = host.assignee(&platform, &channel).unwrap_or_default().to_string();
                tracing::debug!("line {}: {:?} -> assignee '{}'", line, outcome, assignee);
                steps.push(ReplayStep {
                    line,
                    message_id,
                    channel,
                    outcome,
                    assignee,
                });
            }
        }
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &str) -> Result<Vec<(usize, HostEvent)>, ReplayError> {
        let mut source = LineSource::new(input.as_bytes());
        let mut events = Vec::new();
        while let Some(event) = source.next_event().await? {
            events.push(event);
        }
        Ok(events)
    }

    #[tokio::test]
    async fn test_line_source_skips_comments() {
        let events = collect("# setup\n\n{\"type\":\"ready\"}\n").await.unwrap();
        assert_eq!(events, vec![(3, HostEvent::Ready)]);
    }

    #[tokio::test]
    async fn test_malformed_line_reports_position() {
        let err = collect("{\"type\":\"ready\"}\n{\"type\":\"bogus\"}\n").await.unwrap_err();
        assert!(matches!(err, ReplayError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_message_event_conversion() {
        let event: HostEvent = serde_json::from_str(
            r#"{"type":"message","platform":"onebot","channel":"c1","user":"u1","guild":"g1","command":"","mentions":["B"]}"#,
        )
        .unwrap();
        let HostEvent::Message(event) = event else { panic!("expected message") };
        let message = event.into_message();
        assert_eq!(message.guild_id.as_deref(), Some("g1"));
        assert_eq!(message.command, Some(crate::domain::entities::CommandParse::Unresolved));
        assert_eq!(message.mentions, vec!["B"]);
    }
}
