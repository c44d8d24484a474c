//! Source filter - gates messages by where they come from

use super::DecisionLog;
use crate::domain::entities::{FilterMode, IncomingMessage, SourceFilter, SourceRule};

/// Whether a single rule matches the message origin
pub fn rule_matches(rule: &SourceRule, message: &IncomingMessage) -> bool {
    match rule {
        SourceRule::Guild(id) => message.guild_id.as_deref() == Some(id.as_str()),
        SourceRule::User(id) => message.user_id == *id,
        SourceRule::Channel(id) => message.channel_id == *id,
        SourceRule::Private(flag) => message.is_direct == *flag,
    }
}

/// Absolute gate evaluated before any other filter.
pub fn passes(filter: &SourceFilter, message: &IncomingMessage, log: &DecisionLog<'_>) -> bool {
    if !filter.enabled || filter.rules.is_empty() {
        log.note("source filter inactive, origin accepted");
        return true;
    }

    let hit = filter.rules.iter().find(|rule| rule_matches(rule, message));
    let result = match filter.mode {
        FilterMode::Whitelist => hit.is_some(),
        FilterMode::Blacklist => hit.is_none(),
    };

    match hit {
        Some(rule) => log.note(format!(
            "source matched rule {}, {} mode -> {}",
            rule, filter.mode, result
        )),
        None => log.note(format!(
            "source matched no rule, {} mode -> {}",
            filter.mode, result
        )),
    }
    result
}
