//! In-memory host - bot sessions, channel records and message dispatch

use std::collections::HashMap;
use tracing::{debug, info};

use crate::application::arbitration::{Outcome, Precedence};
use crate::application::errors::HostError;
use crate::application::messaging::MessageParser;
use crate::application::services::{ControllerService, PolicySet, ReadySummary};
use crate::domain::entities::{BotIdentity, Channel, IncomingMessage};

/// How the host invokes the preprocessing hook for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One arbitration over every attached bot.
    #[default]
    Batch,
    /// One hook call per attached bot, in attach order.
    PerBot,
}

struct ChannelState {
    channel: Channel,
    attached: Vec<BotIdentity>,
}

/// Host simulation driving the controller
pub struct InMemoryHost {
    controller: ControllerService,
    parser: MessageParser,
    dispatch: DispatchMode,
    bots: Vec<(BotIdentity, bool)>,
    channels: HashMap<(String, String), ChannelState>,
}

impl InMemoryHost {
    pub fn new(controller: ControllerService, parser: MessageParser) -> Self {
        Self {
            controller,
            parser,
            dispatch: DispatchMode::default(),
            bots: Vec::new(),
            channels: HashMap::new(),
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn controller(&self) -> &ControllerService {
        &self.controller
    }

    pub fn reload(&mut self, policies: PolicySet, precedence: Precedence) {
        self.controller.update_policies(policies, precedence);
    }

    /// A bot connection came online. Returns whether it has a policy.
    pub fn login(&mut self, identity: BotIdentity) -> bool {
        let configured = self.controller.on_login_added(&identity);
        match self.bots.iter_mut().find(|(id, _)| *id == identity) {
            Some(entry) => entry.1 = true,
            None => self.bots.push((identity, true)),
        }
        configured
    }

    pub fn logout(&mut self, identity: &BotIdentity) {
        if let Some(entry) = self.bots.iter_mut().find(|(id, _)| id == identity) {
            entry.1 = false;
            info!("Bot offline: {}", identity);
        }
    }

    fn is_online(&self, identity: &BotIdentity) -> bool {
        self.bots.iter().any(|(id, online)| id == identity && *online)
    }

    pub fn ready(&self) -> ReadySummary {
        self.controller
            .on_ready(self.bots.iter().map(|(id, online)| (id, *online)))
    }

    /// Attach a bot to a channel, creating the channel record on first use.
    pub fn attach(&mut self, channel_id: &str, identity: BotIdentity) -> Result<(), HostError> {
        if !self.bots.iter().any(|(id, _)| *id == identity) {
            return Err(HostError::Offline { bot: identity.to_string() });
        }
        let key = (identity.platform.clone(), channel_id.to_string());
        let state = self.channels.entry(key).or_insert_with(|| ChannelState {
            channel: Channel::new(identity.platform.clone(), channel_id),
            attached: Vec::new(),
        });
        if !state.attached.contains(&identity) {
            debug!("{} attached to channel {}", identity, channel_id);
            state.attached.push(identity);
        }
        Ok(())
    }

    /// Identities live on a channel, in attach order.
    pub fn attached(&self, platform: &str, channel_id: &str) -> Vec<BotIdentity> {
        self.channels
            .get(&(platform.to_string(), channel_id.to_string()))
            .map(|state| {
                state
                    .attached
                    .iter()
                    .filter(|id| self.is_online(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn assignee(&self, platform: &str, channel_id: &str) -> Option<&str> {
        self.channels
            .get(&(platform.to_string(), channel_id.to_string()))
            .map(|state| state.channel.assignee())
    }

    /// Run the preprocessing hook for an inbound message.
    pub fn receive(&mut self, message: IncomingMessage) -> Result<Outcome, HostError> {
        let message = self.parser.parse(message);
        if message.is_direct {
            return Ok(Outcome::Skipped);
        }

        let attached = self.attached(&message.platform, &message.channel_id);
        let key = (message.platform.clone(), message.channel_id.clone());
        let state = self
            .channels
            .get_mut(&key)
            .ok_or_else(|| HostError::UnknownChannel(format!("{}:{}", key.0, key.1)))?;

        let outcome = match self.dispatch {
            DispatchMode::Batch => self.controller.on_message(&message, &attached, &mut state.channel),
            DispatchMode::PerBot => {
                let before = state.channel.assignee().to_string();
                for identity in &attached {
                    self.controller
                        .on_message_for(&message.for_receiver(identity), &attached, &mut state.channel);
                }
                match state.channel.assignee() {
                    after if after == before => Outcome::Unchanged,
                    "" => Outcome::Released,
                    after => Outcome::Assigned(after.to_string()),
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BotPolicy, FilterMode, ResponseMode};
    use crate::infrastructure::trace::NoopSink;

    fn host(dispatch: DispatchMode) -> InMemoryHost {
        let policies: PolicySet = vec![
            (BotIdentity::new("onebot", "A"), BotPolicy::new(ResponseMode::Unconstrained)),
            (
                BotIdentity::new("onebot", "B"),
                BotPolicy::new(ResponseMode::Constrained).with_keyword_filter(FilterMode::Blacklist, ["B"]),
            ),
        ]
        .into_iter()
        .collect();
        let controller = ControllerService::new(policies, Precedence::FirstMatch, Box::new(NoopSink));
        let mut host = InMemoryHost::new(controller, MessageParser::default()).with_dispatch(dispatch);
        host.login(BotIdentity::new("onebot", "A"));
        host.login(BotIdentity::new("onebot", "B"));
        host.attach("c1", BotIdentity::new("onebot", "A")).unwrap();
        host.attach("c1", BotIdentity::new("onebot", "B")).unwrap();
        host
    }

    fn msg(text: &str) -> IncomingMessage {
        IncomingMessage::new("onebot", "A", "c1", "u1", text)
    }

    #[test]
    fn test_assignee_persists_across_messages() {
        let mut host = host(DispatchMode::Batch);
        assert_eq!(host.receive(msg("hi")).unwrap(), Outcome::Assigned("A".into()));
        assert_eq!(host.receive(msg("hi again")).unwrap(), Outcome::Unchanged);
        assert_eq!(host.receive(msg(r#"<at id="B"/> over to you"#)).unwrap(), Outcome::Assigned("B".into()));
        assert_eq!(host.assignee("onebot", "c1"), Some("B"));
    }

    #[test]
    fn test_per_bot_dispatch_is_last_wins() {
        let mut host = host(DispatchMode::PerBot);
        host.receive(msg("call B now")).unwrap();
        assert_eq!(host.assignee("onebot", "c1"), Some("B"));
    }

    #[test]
    fn test_offline_bots_are_not_arbitrated() {
        let mut host = host(DispatchMode::Batch);
        host.logout(&BotIdentity::new("onebot", "A"));
        assert_eq!(host.attached("onebot", "c1"), vec![BotIdentity::new("onebot", "B")]);
        assert_eq!(host.receive(msg("call B now")).unwrap(), Outcome::Assigned("B".into()));
    }

    #[test]
    fn test_unknown_channel_and_bot() {
        let mut host = host(DispatchMode::Batch);
        let err = host.receive(IncomingMessage::new("onebot", "A", "c9", "u1", "hi")).unwrap_err();
        assert!(matches!(err, HostError::UnknownChannel(_)));
        let err = host.attach("c1", BotIdentity::new("onebot", "Z")).unwrap_err();
        assert!(matches!(err, HostError::Offline { .. }));
    }

    #[test]
    fn test_direct_message_skipped() {
        let mut host = host(DispatchMode::Batch);
        let dm = IncomingMessage::new("onebot", "A", "dm-1", "u1", "hi").direct();
        assert_eq!(host.receive(dm).unwrap(), Outcome::Skipped);
    }

    #[test]
    fn test_ready_summary() {
        let mut host = host(DispatchMode::Batch);
        host.login(BotIdentity::new("onebot", "C"));
        host.logout(&BotIdentity::new("onebot", "A"));
        let summary = host.ready();
        assert_eq!((summary.total, summary.online, summary.unconfigured), (3, 2, 1));
    }
}
