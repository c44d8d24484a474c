//! Keyword filter - only consulted for non-command messages in constrained mode

use super::DecisionLog;
use crate::domain::entities::{FilterMode, KeywordFilter};

/// Case-sensitive substring match of any keyword against `text`.
pub fn passes(filter: &KeywordFilter, text: &str, log: &DecisionLog<'_>) -> bool {
    if !filter.enabled {
        log.note("keyword filter disabled");
        return false;
    }
    if filter.keywords.is_empty() {
        log.note("keyword list empty");
        return false;
    }

    let hit = filter.keywords.iter().find(|kw| text.contains(kw.as_str()));
    let result = match filter.mode {
        FilterMode::Blacklist => hit.is_some(),
        FilterMode::Whitelist => hit.is_none(),
    };
    match hit {
        Some(kw) => log.note(format!("keyword \"{}\" matched, {} mode -> {}", kw, filter.mode, result)),
        None => log.note(format!("no keyword matched, {} mode -> {}", filter.mode, result)),
    }
    result
}
