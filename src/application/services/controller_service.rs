use tracing::{debug, info, warn};

use crate::application::arbitration::{Arbiter, Outcome, Precedence};
use crate::domain::entities::{BotIdentity, BotPolicy, Channel, IncomingMessage};
use crate::domain::traits::{PolicyStore, TraceSink};

/// Configured policies in configuration order
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    entries: Vec<(BotIdentity, BotPolicy)>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for an identity already present replace the earlier one.
    pub fn insert(&mut self, identity: BotIdentity, policy: BotPolicy) {
        match self.entries.iter_mut().find(|(id, _)| *id == identity) {
            Some(entry) => entry.1 = policy,
            None => self.entries.push((identity, policy)),
        }
    }

    pub fn identities(&self) -> impl Iterator<Item = &BotIdentity> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PolicyStore for PolicySet {
    fn policy(&self, platform: &str, self_id: &str) -> Option<&BotPolicy> {
        self.entries.as_slice().policy(platform, self_id)
    }
}

impl FromIterator<(BotIdentity, BotPolicy)> for PolicySet {
    fn from_iter<T: IntoIterator<Item = (BotIdentity, BotPolicy)>>(iter: T) -> Self {
        let mut set = PolicySet::new();
        for (identity, policy) in iter {
            set.insert(identity, policy);
        }
        set
    }
}

/// Bots seen by the host when it becomes ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadySummary {
    pub total: usize,
    pub online: usize,
    pub unconfigured: usize,
}

/// Owns the policy set and answers host hooks
pub struct ControllerService {
    policies: PolicySet,
    precedence: Precedence,
    sink: Box<dyn TraceSink>,
}

impl ControllerService {
    pub fn new(policies: PolicySet, precedence: Precedence, sink: Box<dyn TraceSink>) -> Self {
        info!("Multi-bot controller loaded with {} bot policies", policies.len());
        Self {
            policies,
            precedence,
            sink,
        }
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    pub fn policy(&self, platform: &str, self_id: &str) -> Option<&BotPolicy> {
        self.policies.policy(platform, self_id)
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Swap in a reloaded policy set.
    pub fn update_policies(&mut self, policies: PolicySet, precedence: Precedence) {
        self.policies = policies;
        self.precedence = precedence;
        info!(
            "Configuration updated, {} bot policies, precedence {}",
            self.policies.len(),
            self.precedence
        );
    }

    fn arbiter(&self) -> Arbiter<'_, PolicySet> {
        Arbiter::new(&self.policies, self.sink.as_ref()).with_precedence(self.precedence)
    }

    /// Preprocessing hook for one inbound message on a shared channel.
    pub fn on_message(
        &self,
        message: &IncomingMessage,
        attached: &[BotIdentity],
        channel: &mut Channel,
    ) -> Outcome {
        let outcome = self.arbiter().arbitrate(message, attached, channel);
        match &outcome {
            Outcome::Assigned(self_id) => {
                debug!("[{}] channel {} assigned to {}", message.platform, channel.id, self_id)
            }
            Outcome::Released => debug!("[{}] channel {} released", message.platform, channel.id),
            Outcome::Unchanged | Outcome::Skipped => {}
        }
        outcome
    }

    /// Hook variant invoked once per attached bot, as a host without batch
    /// dispatch would call it.
    pub fn on_message_for(
        &self,
        message: &IncomingMessage,
        attached: &[BotIdentity],
        channel: &mut Channel,
    ) -> Outcome {
        self.arbiter().arbitrate_identity(message, attached, channel)
    }

    /// Returns whether the new bot has a policy.
    pub fn on_login_added(&self, identity: &BotIdentity) -> bool {
        info!("Bot online: {}", identity);
        let configured = self.policies.policy_for(identity).is_some();
        if !configured {
            warn!("Bot {} has no policy yet, add one to control it", identity);
        }
        configured
    }

    pub fn on_ready<'b, I>(&self, bots: I) -> ReadySummary
    where
        I: IntoIterator<Item = (&'b BotIdentity, bool)>,
    {
        let mut summary = ReadySummary::default();
        for (identity, online) in bots {
            summary.total += 1;
            if online {
                summary.online += 1;
            }
            if self.policies.policy_for(identity).is_none() {
                summary.unconfigured += 1;
            }
        }

        info!("Multi-bot controller ready, {} bots detected", summary.total);
        info!("{} of them online", summary.online);
        if summary.unconfigured > 0 {
            info!("{} bots have no policy", summary.unconfigured);
        }
        summary
    }
}
