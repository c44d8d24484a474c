/// Channel record shared by every bot identity attached to it.
///
/// `assignee` holds the self id of the bot that handles the channel, or the
/// empty string when nobody does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub platform: String,
    assignee: String,
    writes: u64,
}

impl Channel {
    pub fn new(platform: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            assignee: String::new(),
            writes: 0,
        }
    }

    pub fn with_assignee(mut self, self_id: impl Into<String>) -> Self {
        self.assignee = self_id.into();
        self
    }

    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    pub fn set_assignee(&mut self, self_id: impl Into<String>) {
        self.assignee = self_id.into();
        self.writes += 1;
    }

    pub fn is_held_by(&self, self_id: &str) -> bool {
        !self.assignee.is_empty() && self.assignee == self_id
    }

    /// Number of writes to the assignee field since creation.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}
