//! Session state fuzzer
//!
//! Drives an App through arbitrary interleavings of user intents and server
//! frames, checking after every step that:
//! - The open conversation never has unread messages
//! - Nothing is put on the wire for a group name that fails validation
//! - Own echoes never land in a conversation

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use talkie_app::{App, AppAction, Bridge};
use talkie_client::TransportEvent;
use talkie_proto::Envelope;

const ME: &str = "me";

#[derive(Debug, Arbitrary)]
enum Op {
    Open { peer: u8, group: bool },
    Send(String),
    Create(String),
    Join(u8),
    Frame(String),
    Message { from: u8, group: bool, text: String },
    Close(u16),
}

fn name(n: u8) -> String {
    format!("u{}", n % 4)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut app = App::default();
    let mut bridge = Bridge::new();
    let _ = app.login(ME);
    let register = Envelope::Register { content: format!("Registered as {ME}") };
    feed(&mut app, &mut bridge, TransportEvent::Message(register));

    for op in ops {
        let logged = total_messages(&app);
        let mut echo_from_me = false;
        match op {
            Op::Open { peer, group: true } => drop(app.open_group_chat(name(peer))),
            Op::Open { peer, group: false } => drop(app.open_private_chat(name(peer))),
            Op::Send(text) => drop(app.send_message(&text)),
            Op::Create(group) => {
                let valid = (3..=50).contains(&group.trim().chars().count());
                let actions = app.create_group(&group);
                if !valid {
                    assert!(!actions.iter().any(|a| matches!(a, AppAction::CreateGroup { .. })));
                }
            },
            Op::Join(n) => drop(app.join_group(&name(n))),
            Op::Frame(text) => {
                let event = match Envelope::decode(&text) {
                    Ok(envelope) => {
                        echo_from_me = envelope.sender() == Some(ME);
                        TransportEvent::Message(envelope)
                    },
                    Err(e) => TransportEvent::Malformed(e),
                };
                feed(&mut app, &mut bridge, event);
            },
            Op::Message { from, group, text } => {
                let json = if group {
                    format!(r#"{{"type":"group_message","from":"{}","group_name":"{}","content":{:?}}}"#, name(from), name(from), text)
                } else {
                    format!(r#"{{"type":"private","from":"{}","to":"{ME}","content":{:?}}}"#, name(from), text)
                };
                if let Ok(envelope) = Envelope::decode(&json) {
                    feed(&mut app, &mut bridge, TransportEvent::Message(envelope));
                }
            },
            Op::Close(code) => feed(&mut app, &mut bridge, TransportEvent::Closed { code }),
        }

        if let Some(open) = app.current_chat() {
            assert_eq!(app.unread_count(open), 0);
        }
        if echo_from_me {
            assert_eq!(total_messages(&app), logged);
        }
    }
});

fn feed(app: &mut App, bridge: &mut Bridge, event: TransportEvent) {
    for event in bridge.handle_event(event) {
        drop(app.handle(event));
    }
}

fn total_messages(app: &App) -> usize {
    app.conversations().into_iter().map(|target| app.messages(target).len()).sum()
}
