//! Filter evaluator - decides whether one bot should respond to one message
//!
//! Evaluation short-circuits in a fixed order: master switch, source gate,
//! then either the command filter (command messages) or the response mode
//! and keyword filter (everything else).

pub mod command;
pub mod keyword;
pub mod source;

use crate::domain::entities::{BotPolicy, CommandParse, IncomingMessage, ResponseMode};
use crate::domain::traits::{TraceEvent, TraceSink};

/// Writes decision traces for one message/bot pair
pub struct DecisionLog<'a> {
    message: &'a IncomingMessage,
    sink: &'a dyn TraceSink,
}

impl<'a> DecisionLog<'a> {
    pub fn new(message: &'a IncomingMessage, sink: &'a dyn TraceSink) -> Self {
        Self { message, sink }
    }

    pub fn note(&self, text: impl Into<String>) {
        self.sink.record(TraceEvent::new(self.message, text));
    }
}

/// Returns `true` when the bot described by `policy` should respond to `message`.
pub fn evaluate(message: &IncomingMessage, policy: &BotPolicy, sink: &dyn TraceSink) -> bool {
    let log = DecisionLog::new(message, sink);

    if !policy.enabled {
        log.note("bot disabled");
        return false;
    }

    if !source::passes(&policy.source_filter, message, &log) {
        return false;
    }

    match &message.command {
        Some(CommandParse::Resolved { name, .. }) => {
            command::passes(&policy.command_filter, name, &log)
        }
        Some(CommandParse::Unresolved) => {
            log.note("command could not be resolved, passing through");
            true
        }
        None => match policy.mode {
            ResponseMode::Unconstrained => {
                log.note("unconstrained mode: non-command message passes");
                true
            }
            ResponseMode::Constrained => keyword::passes(&policy.keyword_filter, &message.text, &log),
        },
    }
}
