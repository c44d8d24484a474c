//! Arbitration scenario tests
//! Run with: cargo test --test arbitration_test

use std::sync::Once;

use multi_bot_controller::application::arbitration::{Arbiter, Outcome, Precedence};
use multi_bot_controller::domain::entities::{
    BotIdentity, BotPolicy, Channel, FilterMode, IncomingMessage, ResponseMode, SourceRule,
};
use multi_bot_controller::evaluate;
use multi_bot_controller::infrastructure::trace::{MemorySink, TracingSink};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn a() -> BotIdentity {
    BotIdentity::new("onebot", "A")
}

fn b() -> BotIdentity {
    BotIdentity::new("onebot", "B")
}

fn group(text: &str) -> IncomingMessage {
    IncomingMessage::new("onebot", "A", "c1", "u1", text).with_guild("g1")
}

fn keyword_policy() -> BotPolicy {
    BotPolicy::new(ResponseMode::Constrained).with_keyword_filter(FilterMode::Blacklist, ["help"])
}

#[test]
fn scenario_a_keyword_hit() {
    ensure_init();
    assert!(evaluate(&group("need help please"), &keyword_policy(), &TracingSink::new(true)));
}

#[test]
fn scenario_b_keyword_miss() {
    ensure_init();
    assert!(!evaluate(&group("hello"), &keyword_policy(), &TracingSink::new(true)));
}

#[test]
fn scenario_c_command_whitelist() {
    ensure_init();
    let policy = BotPolicy::new(ResponseMode::Unconstrained).with_command_filter(FilterMode::Whitelist, ["ping"]);
    let sink = MemorySink::new();
    assert!(!evaluate(&group("/ping").with_command("ping", vec![]), &policy, &sink));
    assert!(evaluate(&group("/status").with_command("status", vec![]), &policy, &sink));

    let events = sink.events();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.channel_id == "c1" && e.user_id == "u1"));
    assert!(events[1].message.contains("in list"));
}

fn scenario_d_policies() -> Vec<(BotIdentity, BotPolicy)> {
    vec![
        (a(), BotPolicy::new(ResponseMode::Unconstrained)),
        (
            b(),
            BotPolicy::new(ResponseMode::Constrained).with_keyword_filter(FilterMode::Blacklist, ["B"]),
        ),
    ]
}

#[test]
fn scenario_d_overlapping_filters_last_evaluated_wins() {
    ensure_init();
    let policies = scenario_d_policies();
    let sink = MemorySink::new();
    let arbiter = Arbiter::new(&policies, &sink);
    let message = group("call B now");

    assert!(evaluate(&message.for_receiver(&a()), &policies[0].1, &sink));
    assert!(evaluate(&message.for_receiver(&b()), &policies[1].1, &sink));

    for (order, expected) in [([a(), b()], "B"), ([b(), a()], "A")] {
        let mut channel = Channel::new("onebot", "c1");
        for identity in &order {
            arbiter.arbitrate_identity(&message.for_receiver(identity), &order, &mut channel);
        }
        assert_eq!(channel.assignee(), expected);
    }
}

#[test]
fn scenario_d_batch_last_match_equals_sequential() {
    ensure_init();
    let policies = scenario_d_policies();
    let sink = MemorySink::new();
    let arbiter = Arbiter::new(&policies, &sink).with_precedence(Precedence::LastMatch);

    let messages = [
        group("call B now"),
        group("hello"),
        group("hello").with_mention("B"),
        group("B?").with_mention("A"),
        group("/ping").with_command("ping", vec![]),
        group("B").direct(),
    ];
    let starts = ["", "A", "B", "Z"];

    for message in &messages {
        for start in starts {
            for order in [[a(), b()], [b(), a()]] {
                let mut sequential = Channel::new("onebot", "c1").with_assignee(start);
                for identity in &order {
                    arbiter.arbitrate_identity(&message.for_receiver(identity), &order, &mut sequential);
                }
                let mut batch = Channel::new("onebot", "c1").with_assignee(start);
                arbiter.arbitrate(message, &order, &mut batch);
                assert_eq!(
                    batch.assignee(),
                    sequential.assignee(),
                    "text={:?} start={:?} order={:?}",
                    message.text,
                    start,
                    order
                );
            }
        }
    }
}

#[test]
fn scenario_d_first_match_is_order_explicit() {
    ensure_init();
    let policies = scenario_d_policies();
    let sink = MemorySink::new();
    let arbiter = Arbiter::new(&policies, &sink).with_precedence(Precedence::FirstMatch);

    let mut channel = Channel::new("onebot", "c1");
    arbiter.arbitrate(&group("call B now"), &[b(), a()], &mut channel);
    assert_eq!(channel.assignee(), "B");
    assert_eq!(channel.writes(), 1);
}

#[test]
fn scenario_e_mention_wins_and_releases_previous_holder() {
    ensure_init();
    // A would stay silent on its own: constrained, no keywords, wrong guild
    let policies = vec![
        (
            a(),
            BotPolicy::new(ResponseMode::Constrained)
                .with_source_filter(FilterMode::Whitelist, vec![SourceRule::Guild("other".into())]),
        ),
        (b(), BotPolicy::new(ResponseMode::Unconstrained)),
    ];
    let sink = MemorySink::new();
    let message = group(r#"<at id="A"/> what's up"#);

    for precedence in [Precedence::FirstMatch, Precedence::LastMatch, Precedence::Priority] {
        let arbiter = Arbiter::new(&policies, &sink).with_precedence(precedence);
        let mut channel = Channel::new("onebot", "c1").with_assignee("B");
        assert_eq!(arbiter.arbitrate(&message, &[b(), a()], &mut channel), Outcome::Assigned("A".into()));
    }

    let arbiter = Arbiter::new(&policies, &sink);
    let mut channel = Channel::new("onebot", "c1").with_assignee("B");
    let attached = [b(), a()];
    assert_eq!(
        arbiter.arbitrate_identity(&message.for_receiver(&b()), &attached, &mut channel),
        Outcome::Released
    );
    assert_eq!(channel.assignee(), "");
    assert_eq!(
        arbiter.arbitrate_identity(&message.for_receiver(&a()), &attached, &mut channel),
        Outcome::Assigned("A".into())
    );
}

#[test]
fn repeated_arbitration_is_stable() {
    ensure_init();
    let policies = scenario_d_policies();
    let sink = MemorySink::new();
    let arbiter = Arbiter::new(&policies, &sink);
    let attached = [a(), b()];

    for message in [group("hello"), group("call B now"), group("hey").with_mention("B")] {
        let mut channel = Channel::new("onebot", "c1");
        arbiter.arbitrate(&message, &attached, &mut channel);
        let (assignee, writes) = (channel.assignee().to_string(), channel.writes());
        assert_eq!(arbiter.arbitrate(&message, &attached, &mut channel), Outcome::Unchanged);
        assert_eq!((channel.assignee(), channel.writes()), (assignee.as_str(), writes));
    }
}

#[test]
fn disabled_policy_never_claims_or_clobbers() {
    ensure_init();
    let policies = vec![(a(), BotPolicy::new(ResponseMode::Unconstrained).disabled())];
    let sink = MemorySink::new();
    let arbiter = Arbiter::new(&policies, &sink);

    for text in ["hi", "help", "/ping"] {
        assert!(!evaluate(&group(text), &policies[0].1, &sink));
    }

    let mut channel = Channel::new("onebot", "c1").with_assignee("Z");
    arbiter.arbitrate(&group("hi"), &[a()], &mut channel);
    assert_eq!(channel.assignee(), "Z");
}
