//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::application::arbitration::Precedence;
use crate::application::errors::ConfigError;
use crate::application::services::PolicySet;
use crate::domain::entities::{
    BotIdentity, BotPolicy, CommandFilter, FilterMode, KeywordFilter, ResponseMode, SourceFilter, SourceRule,
};

/// Controller configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bots: Vec<BotConfig>,
    /// Emit a trace line for every decision point.
    pub debug: bool,
    pub arbitration: ArbitrationConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArbitrationConfig {
    pub precedence: Precedence,
    /// Command prefixes recognised when the host does not parse commands.
    pub command_prefixes: Vec<String>,
}

/// Response control settings of one bot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub platform: String,
    pub self_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub mode: ResponseMode,
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub enable_source_filter: bool,
    #[serde(default)]
    pub source_filters: Vec<SourceRule>,
    #[serde(default = "default_whitelist")]
    pub source_filter_mode: FilterMode,

    #[serde(default)]
    pub enable_command_filter: bool,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default = "default_blacklist")]
    pub command_filter_mode: FilterMode,

    #[serde(default)]
    pub enable_keyword_filter: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_blacklist")]
    pub keyword_filter_mode: FilterMode,
}

fn default_true() -> bool {
    true
}

fn default_whitelist() -> FilterMode {
    FilterMode::Whitelist
}

fn default_blacklist() -> FilterMode {
    FilterMode::Blacklist
}

impl BotConfig {
    pub fn new(platform: impl Into<String>, self_id: impl Into<String>, mode: ResponseMode) -> Self {
        Self {
            platform: platform.into(),
            self_id: self_id.into(),
            enabled: true,
            mode,
            priority: 0,
            enable_source_filter: false,
            source_filters: Vec::new(),
            source_filter_mode: FilterMode::Whitelist,
            enable_command_filter: false,
            commands: Vec::new(),
            command_filter_mode: FilterMode::Blacklist,
            enable_keyword_filter: false,
            keywords: Vec::new(),
            keyword_filter_mode: FilterMode::Blacklist,
        }
    }

    pub fn identity(&self) -> BotIdentity {
        BotIdentity::new(self.platform.clone(), self.self_id.clone())
    }

    pub fn to_policy(&self) -> BotPolicy {
        // keyword settings only exist for constrained bots
        let keyword_filter = match self.mode {
            ResponseMode::Constrained => KeywordFilter {
                enabled: self.enable_keyword_filter,
                keywords: self.keywords.clone(),
                mode: self.keyword_filter_mode,
            },
            ResponseMode::Unconstrained => KeywordFilter::default(),
        };

        BotPolicy {
            enabled: self.enabled,
            mode: self.mode,
            priority: self.priority,
            source_filter: SourceFilter {
                enabled: self.enable_source_filter,
                rules: self.source_filters.clone(),
                mode: self.source_filter_mode,
            },
            command_filter: CommandFilter {
                enabled: self.enable_command_filter,
                names: self.commands.iter().cloned().collect(),
                mode: self.command_filter_mode,
            },
            keyword_filter,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (idx, bot) in self.bots.iter().enumerate() {
            if bot.platform.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("bots[{}].platform", idx)));
            }
            if bot.self_id.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("bots[{}].self-id", idx)));
            }
            if !seen.insert(bot.identity()) {
                return Err(ConfigError::Duplicate(bot.identity().to_string()));
            }
        }
        if self.arbitration.command_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("empty command prefix".to_string()));
        }
        Ok(())
    }

    /// Apply `MBC_DEBUG` and `MBC_PRECEDENCE` on top of the loaded values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(debug) = std::env::var("MBC_DEBUG") {
            self.debug = matches!(debug.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Ok(precedence) = std::env::var("MBC_PRECEDENCE") {
            self.arbitration.precedence = precedence.parse().map_err(ConfigError::InvalidValue)?;
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        if let Err(e) = config.apply_env() {
            tracing::warn!("Ignoring environment overrides: {}", e);
        }
        config
    }

    pub fn policies(&self) -> PolicySet {
        self.bots.iter().map(|bot| (bot.identity(), bot.to_policy())).collect()
    }

    pub fn command_prefixes(&self) -> Vec<String> {
        if self.arbitration.command_prefixes.is_empty() {
            vec!["/".to_string()]
        } else {
            self.arbitration.command_prefixes.clone()
        }
    }

    /// Sample configuration written by `init-config`.
    pub fn example() -> Self {
        let mut helper = BotConfig::new("onebot", "10001", ResponseMode::Constrained);
        helper.enable_keyword_filter = true;
        helper.keywords = vec!["help".to_string()];
        helper.enable_command_filter = true;
        helper.commands = vec!["weather".to_string(), "remind".to_string()];

        let mut chat = BotConfig::new("onebot", "10002", ResponseMode::Unconstrained);
        chat.enable_command_filter = true;
        chat.command_filter_mode = FilterMode::Whitelist;
        chat.commands = vec!["weather".to_string(), "remind".to_string()];

        Self {
            bots: vec![helper, chat],
            debug: false,
            arbitration: ArbitrationConfig::default(),
        }
    }
}
