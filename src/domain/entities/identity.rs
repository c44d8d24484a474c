use std::fmt;
use std::str::FromStr;

/// One bot connection, identified by its platform and account id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BotIdentity {
    pub platform: String,
    pub self_id: String,
}

impl BotIdentity {
    pub fn new(platform: impl Into<String>, self_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            self_id: self_id.into(),
        }
    }

    pub fn matches(&self, platform: &str, self_id: &str) -> bool {
        self.platform == platform && self.self_id == self_id
    }
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.self_id)
    }
}

/// Parses the `platform:selfId` form used by the CLI and replay files.
impl FromStr for BotIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((platform, self_id)) if !platform.is_empty() && !self_id.is_empty() => {
                Ok(Self::new(platform, self_id))
            }
            _ => Err(format!("expected <platform>:<self-id>, got '{}'", s)),
        }
    }
}
