use crate::domain::entities::{BotIdentity, BotPolicy};

/// Policy lookup - answers which policy, if any, applies to a bot identity
pub trait PolicyStore {
    fn policy(&self, platform: &str, self_id: &str) -> Option<&BotPolicy>;

    fn policy_for(&self, identity: &BotIdentity) -> Option<&BotPolicy> {
        self.policy(&identity.platform, &identity.self_id)
    }
}

impl PolicyStore for [(BotIdentity, BotPolicy)] {
    fn policy(&self, platform: &str, self_id: &str) -> Option<&BotPolicy> {
        self.iter()
            .find(|(id, _)| id.matches(platform, self_id))
            .map(|(_, policy)| policy)
    }
}

impl PolicyStore for Vec<(BotIdentity, BotPolicy)> {
    fn policy(&self, platform: &str, self_id: &str) -> Option<&BotPolicy> {
        self.as_slice().policy(platform, self_id)
    }
}
