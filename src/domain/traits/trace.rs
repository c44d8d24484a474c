use chrono::{DateTime, Utc};
use crate::domain::entities::{BotIdentity, IncomingMessage};

/// One decision point recorded while arbitrating a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub identity: BotIdentity,
    pub message_id: String,
    pub channel_id: String,
    pub user_id: String,
    /// Receive time of the message the decision was made for.
    pub received_at: DateTime<Utc>,
    pub message: String,
}

impl TraceEvent {
    /// Decision about `message` as seen by its receiving bot.
    pub fn new(message: &IncomingMessage, text: impl Into<String>) -> Self {
        Self {
            identity: message.receiver(),
            message_id: message.id.clone(),
            channel_id: message.channel_id.clone(),
            user_id: message.user_id.clone(),
            received_at: message.timestamp,
            message: text.into(),
        }
    }
}

/// Sink for decision traces. Recording must never influence a verdict.
pub trait TraceSink {
    fn record(&self, event: TraceEvent);
}
