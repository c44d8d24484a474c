//! Mention extraction

use once_cell::sync::Lazy;
use regex_lite::Regex;
use crate::domain::entities::{BotIdentity, IncomingMessage};

static AT_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<at\b[^>]*?\sid\s*=\s*"([^"]*)"[^>]*>"#).expect("valid at-element pattern")
});

/// Ids addressed by `<at id="..."/>` elements in `text`, in order of appearance.
pub fn extract_at_ids(text: &str) -> Vec<String> {
    AT_ELEMENT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Every mention target of the message, without duplicates.
pub fn mention_targets(message: &IncomingMessage) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for id in message.mentions.iter().cloned().chain(extract_at_ids(&message.text)) {
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets
}

/// Attached bots addressed by the message. Mentions of anything that is not a
/// bot attached to the channel are ignored.
pub fn mentioned_bots<'a>(message: &IncomingMessage, attached: &'a [BotIdentity]) -> Vec<&'a BotIdentity> {
    let targets = mention_targets(message);
    if targets.is_empty() {
        return Vec::new();
    }
    attached
        .iter()
        .filter(|id| id.platform == message.platform && targets.contains(&id.self_id))
        .collect()
}
