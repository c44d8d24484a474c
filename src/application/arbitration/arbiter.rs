//! Assignment arbiter
//!
//! Turns mentions and filter verdicts into at most one write of a channel's
//! `assignee` field. Two entry points exist:
//!
//! - [`Arbiter::arbitrate_identity`] runs the transition for a single bot, the
//!   way a host hook invoked once per attached bot would. Running it over all
//!   attached bots in sequence lets the last claimant win.
//! - [`Arbiter::arbitrate`] collects every attached bot's intent first and
//!   resolves competing claims with an explicit [`Precedence`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::mentions::mentioned_bots;
use crate::application::filter::{evaluate, DecisionLog};
use crate::domain::entities::{BotIdentity, BotPolicy, Channel, IncomingMessage};
use crate::domain::traits::{PolicyStore, TraceSink};

/// Rule choosing the winner when several bots claim the same message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// First claimant in attach order.
    #[default]
    FirstMatch,
    /// Last claimant in attach order, identical to sequential per-bot hooks.
    LastMatch,
    /// Highest policy priority; ties go to the earlier attached bot.
    Priority,
}

impl Precedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precedence::FirstMatch => "first-match",
            Precedence::LastMatch => "last-match",
            Precedence::Priority => "priority",
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Precedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-match" | "first" => Ok(Precedence::FirstMatch),
            "last-match" | "last" => Ok(Precedence::LastMatch),
            "priority" => Ok(Precedence::Priority),
            other => Err(format!("unknown precedence '{}'", other)),
        }
    }
}

/// What one bot wants to do with the channel for the current message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    /// No policy: neither claim nor release.
    Abstain,
    Claim,
    /// Give the channel up if currently held.
    Release,
}

/// Observable result of an arbitration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Direct message, or no policy for the bot.
    Skipped,
    Unchanged,
    Assigned(String),
    Released,
}

pub struct Arbiter<'a, P: PolicyStore + ?Sized> {
    policies: &'a P,
    precedence: Precedence,
    sink: &'a dyn TraceSink,
}

impl<'a, P: PolicyStore + ?Sized> Arbiter<'a, P> {
    pub fn new(policies: &'a P, sink: &'a dyn TraceSink) -> Self {
        Self {
            policies,
            precedence: Precedence::default(),
            sink,
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Intent of `identity` for `message`, consulting filters only when no
    /// attached bot is mentioned.
    fn intent(
        &self,
        message: &IncomingMessage,
        identity: &BotIdentity,
        mentioned: &[&BotIdentity],
    ) -> (Intent, Option<&'a BotPolicy>) {
        let view = message.for_receiver(identity);
        let log = DecisionLog::new(&view, self.sink);

        let Some(policy) = self.policies.policy_for(identity) else {
            log.note("no policy configured, not interfering");
            return (Intent::Abstain, None);
        };

        if !mentioned.is_empty() {
            if mentioned.contains(&identity) {
                log.note("mentioned, taking over");
                return (Intent::Claim, Some(policy));
            }
            log.note("another bot was mentioned, standing down");
            return (Intent::Release, Some(policy));
        }

        let intent = if evaluate(&view, policy, self.sink) {
            Intent::Claim
        } else {
            Intent::Release
        };
        (intent, Some(policy))
    }

    /// Per-bot transition for the receiving bot of `message`.
    pub fn arbitrate_identity(
        &self,
        message: &IncomingMessage,
        attached: &[BotIdentity],
        channel: &mut Channel,
    ) -> Outcome {
        if message.is_direct {
            return Outcome::Skipped;
        }

        let identity = message.receiver();
        let mentioned = mentioned_bots(message, attached);
        let log = DecisionLog::new(message, self.sink);

        match self.intent(message, &identity, &mentioned).0 {
            Intent::Abstain => Outcome::Skipped,
            Intent::Claim if channel.is_held_by(&identity.self_id) => Outcome::Unchanged,
            Intent::Claim => {
                log.note("claiming channel");
                channel.set_assignee(identity.self_id);
                Outcome::Assigned(channel.assignee().to_string())
            }
            Intent::Release if channel.is_held_by(&identity.self_id) => {
                log.note("releasing channel");
                channel.set_assignee("");
                Outcome::Released
            }
            Intent::Release => Outcome::Unchanged,
        }
    }

    /// Single-writer arbitration over every attached bot.
    pub fn arbitrate(
        &self,
        message: &IncomingMessage,
        attached: &[BotIdentity],
        channel: &mut Channel,
    ) -> Outcome {
        if message.is_direct {
            return Outcome::Skipped;
        }

        let mentioned = mentioned_bots(message, attached);
        let mut claimants: Vec<(&BotIdentity, &BotPolicy)> = Vec::new();
        let mut releasing: Vec<&BotIdentity> = Vec::new();

        for identity in attached {
            match self.intent(message, identity, &mentioned) {
                (Intent::Claim, Some(policy)) => claimants.push((identity, policy)),
                (Intent::Release, _) => releasing.push(identity),
                _ => {}
            }
        }

        let target = match self.pick(&claimants) {
            Some(winner) => Some(winner.self_id.as_str()),
            None if releasing.iter().any(|id| channel.is_held_by(&id.self_id)) => Some(""),
            None => None,
        };

        match target {
            Some(value) if value != channel.assignee() => {
                channel.set_assignee(value);
                if value.is_empty() {
                    Outcome::Released
                } else {
                    Outcome::Assigned(value.to_string())
                }
            }
            _ if claimants.is_empty() && releasing.is_empty() => Outcome::Skipped,
            _ => Outcome::Unchanged,
        }
    }

    fn pick<'b>(&self, claimants: &[(&'b BotIdentity, &BotPolicy)]) -> Option<&'b BotIdentity> {
        match self.precedence {
            Precedence::FirstMatch => claimants.first().map(|(id, _)| *id),
            Precedence::LastMatch => claimants.last().map(|(id, _)| *id),
            Precedence::Priority => {
                let mut best: Option<(&'b BotIdentity, i32)> = None;
                for (id, policy) in claimants {
                    if best.map_or(true, |(_, p)| policy.priority > p) {
                        best = Some((*id, policy.priority));
                    }
                }
                best.map(|(id, _)| id)
            }
        }
    }
}
