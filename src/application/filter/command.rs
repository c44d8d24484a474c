//! Command filter - decides which parsed commands a bot answers

use super::DecisionLog;
use crate::domain::entities::{CommandFilter, FilterMode};

pub fn passes(filter: &CommandFilter, name: &str, log: &DecisionLog<'_>) -> bool {
    if !filter.enabled {
        log.note(format!("command \"{}\": command filter disabled, passing", name));
        return true;
    }

    // Empty blacklist allows every command, empty whitelist denies every command.
    if filter.names.is_empty() {
        let result = filter.mode == FilterMode::Blacklist;
        log.note(format!(
            "command \"{}\": list empty, {} mode -> {}",
            name, filter.mode, result
        ));
        return result;
    }

    let in_list = filter.names.contains(name);
    let result = match filter.mode {
        FilterMode::Blacklist => in_list,
        FilterMode::Whitelist => !in_list,
    };
    log.note(format!(
        "command \"{}\": {} list, {} mode -> {}",
        name,
        if in_list { "in" } else { "not in" },
        filter.mode,
        result
    ));
    result
}
