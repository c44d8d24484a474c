//! End-to-end replay through the in-memory host
//! Run with: cargo test --test replay_test

use std::sync::Once;

use multi_bot_controller::application::arbitration::Outcome;
use multi_bot_controller::application::errors::ReplayError;
use multi_bot_controller::application::messaging::MessageParser;
use multi_bot_controller::application::services::ControllerService;
use multi_bot_controller::infrastructure::config::Config;
use multi_bot_controller::infrastructure::host::{DispatchMode, InMemoryHost};
use multi_bot_controller::infrastructure::replay::{replay, LineSource};
use multi_bot_controller::infrastructure::trace::TracingSink;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

const CONFIG: &str = r#"
debug: true
arbitration:
  command-prefixes: ["/", "!"]
bots:
  - platform: onebot
    self-id: "10001"
    mode: constrained
    enable-keyword-filter: true
    keywords: [help]
    enable-command-filter: true
    commands: [weather]
  - platform: onebot
    self-id: "10002"
    mode: unconstrained
    enable-command-filter: true
    command-filter-mode: whitelist
    commands: [weather]
"#;

const EVENTS: &str = r#"
# two bots share channel c1
{"type":"login-added","bot":"onebot:10001"}
{"type":"login-added","bot":"onebot:10002"}
{"type":"login-added","bot":"onebot:10003"}
{"type":"attach","channel":"c1","bot":"onebot:10001"}
{"type":"attach","channel":"c1","bot":"onebot:10002"}
{"type":"ready"}
{"type":"message","id":"msg-1","platform":"onebot","channel":"c1","user":"u1","guild":"g1","text":"good morning"}
{"type":"message","platform":"onebot","channel":"c1","user":"u1","guild":"g1","text":"I need help"}
{"type":"message","platform":"onebot","channel":"c1","user":"u1","guild":"g1","text":"!weather berlin"}
{"type":"message","platform":"onebot","channel":"c1","user":"u2","guild":"g1","text":"<at id=\"10002\"/> help me"}
{"type":"message","platform":"onebot","channel":"c1","user":"u2","guild":"g1","text":"need help again"}
{"type":"message","platform":"onebot","channel":"dm-u1","user":"u1","direct":true,"text":"help"}
"#;

fn host(dispatch: DispatchMode) -> InMemoryHost {
    let config = Config::from_yaml(CONFIG).expect("valid config");
    let controller = ControllerService::new(
        config.policies(),
        config.arbitration.precedence,
        Box::new(TracingSink::new(config.debug)),
    );
    let parser = MessageParser::new("/").with_prefix("!");
    InMemoryHost::new(controller, parser).with_dispatch(dispatch)
}

#[tokio::test]
async fn test_replay_assignments() {
    ensure_init();
    let mut host = host(DispatchMode::Batch);
    let mut source = LineSource::new(EVENTS.as_bytes());
    let steps = replay(&mut source, &mut host).await.expect("replay succeeds");

    let assignees: Vec<&str> = steps.iter().map(|s| s.assignee.as_str()).collect();
    // chat bot takes small talk, helper claims "help" first in attach order,
    // weather is only for the helper, mention hands over, keyword pulls back
    assert_eq!(assignees, vec!["10002", "10001", "10001", "10002", "10001", ""]);
    assert_eq!(steps[0].outcome, Outcome::Assigned("10002".into()));
    assert_eq!(steps[2].outcome, Outcome::Unchanged);
    assert_eq!(steps[5].outcome, Outcome::Skipped);

    // host-provided ids are kept, missing ones are generated and distinct
    assert_eq!(steps[0].message_id, "msg-1");
    assert!(!steps[1].message_id.is_empty());
    assert_ne!(steps[1].message_id, steps[2].message_id);

    let summary = host.ready();
    assert_eq!((summary.total, summary.online, summary.unconfigured), (3, 3, 1));
}

#[tokio::test]
async fn test_replay_per_bot_dispatch_last_wins() {
    ensure_init();
    let mut host = host(DispatchMode::PerBot);
    let mut source = LineSource::new(EVENTS.as_bytes());
    let steps = replay(&mut source, &mut host).await.expect("replay succeeds");

    // "I need help": both bots claim, the later attached one wins
    assert_eq!(steps[1].assignee, "10002");
    assert_eq!(steps[2].assignee, "10001");
}

#[tokio::test]
async fn test_replay_rejects_bad_identity() {
    ensure_init();
    let mut host = host(DispatchMode::Batch);
    let mut source = LineSource::new(r#"{"type":"login-added","bot":"onebot"}"#.as_bytes());
    let err = replay(&mut source, &mut host).await.unwrap_err();
    assert!(matches!(err, ReplayError::Malformed { line: 1, .. }));
}

#[tokio::test]
async fn test_replay_attach_unknown_bot_fails() {
    ensure_init();
    let mut host = host(DispatchMode::Batch);
    let mut source = LineSource::new(r#"{"type":"attach","channel":"c1","bot":"onebot:1"}"#.as_bytes());
    let err = replay(&mut source, &mut host).await.unwrap_err();
    assert!(matches!(err, ReplayError::Host(_)));
}
