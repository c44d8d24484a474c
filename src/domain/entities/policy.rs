use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How a bot treats messages that are not commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Non-command messages must pass the keyword filter.
    Constrained,
    /// Non-command messages always pass.
    Unconstrained,
}

/// Polarity of a filter list.
///
/// The naming follows the configuration vocabulary: for the command
/// and keyword filters `Blacklist` responds to entries *in* the list, while for
/// the source filter `Whitelist` is the mode that responds to listed origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Blacklist,
    Whitelist,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Blacklist => "blacklist",
            FilterMode::Whitelist => "whitelist",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single origin rule of the source filter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SourceRule {
    Guild(String),
    User(String),
    Channel(String),
    Private(bool),
}

impl fmt::Display for SourceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRule::Guild(id) => write!(f, "guild={}", id),
            SourceRule::User(id) => write!(f, "user={}", id),
            SourceRule::Channel(id) => write!(f, "channel={}", id),
            SourceRule::Private(flag) => write!(f, "private={}", flag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    pub enabled: bool,
    pub rules: Vec<SourceRule>,
    pub mode: FilterMode,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            rules: Vec::new(),
            mode: FilterMode::Whitelist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFilter {
    pub enabled: bool,
    pub names: BTreeSet<String>,
    pub mode: FilterMode,
}

impl Default for CommandFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            names: BTreeSet::new(),
            mode: FilterMode::Blacklist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    pub enabled: bool,
    pub keywords: Vec<String>,
    pub mode: FilterMode,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            keywords: Vec::new(),
            mode: FilterMode::Blacklist,
        }
    }
}

/// Response policy of one bot identity, immutable between config reloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotPolicy {
    pub enabled: bool,
    pub mode: ResponseMode,
    pub priority: i32,
    pub source_filter: SourceFilter,
    pub command_filter: CommandFilter,
    pub keyword_filter: KeywordFilter,
}

impl BotPolicy {
    pub fn new(mode: ResponseMode) -> Self {
        Self {
            enabled: true,
            mode,
            priority: 0,
            source_filter: SourceFilter::default(),
            command_filter: CommandFilter::default(),
            keyword_filter: KeywordFilter::default(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_source_filter(mut self, mode: FilterMode, rules: Vec<SourceRule>) -> Self {
        self.source_filter = SourceFilter {
            enabled: true,
            rules,
            mode,
        };
        self
    }

    pub fn with_command_filter<I, S>(mut self, mode: FilterMode, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_filter = CommandFilter {
            enabled: true,
            names: names.into_iter().map(Into::into).collect(),
            mode,
        };
        self
    }

    pub fn with_keyword_filter<I, S>(mut self, mode: FilterMode, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_filter = KeywordFilter {
            enabled: true,
            keywords: keywords.into_iter().map(Into::into).collect(),
            mode,
        };
        self
    }
}
