//! Integration tests for App and Bridge behavior.
//!
//! # Oracle Pattern
//!
//! Tests feed server envelopes through the Bridge into the App and end with
//! oracle checks that verify:
//! - Messages land in the right conversation exactly once
//! - Unread counters match what the user has not seen
//! - Rosters reflect the latest server snapshot
//! - Nothing is sent when local validation fails

use talkie_app::{
    App, AppAction, AppEvent, Bridge, ChatTarget, ConnectionState, MessageBody, NotificationLevel,
};
use talkie_client::TransportEvent;
use talkie_proto::{Envelope, Group};

/// Create a registered App ready for testing.
fn registered_app(name: &str) -> App {
    let mut app = App::default();
    let _ = app.login(name);
    receive(&mut app, &mut Bridge::new(), &format!(r#"{{"type":"register","content":"Registered as {name}"}}"#));
    app
}

/// Process actions from App through Bridge and return the envelopes.
fn process_actions(bridge: &mut Bridge, actions: Vec<AppAction>) -> Vec<Envelope> {
    for action in actions {
        if action.is_protocol() {
            bridge.process_app_action(action);
        }
    }
    bridge.take_outgoing()
}

/// Simulate receiving a wire frame from the server.
fn receive(app: &mut App, bridge: &mut Bridge, frame: &str) -> Vec<AppAction> {
    let event = match Envelope::decode(frame) {
        Ok(envelope) => TransportEvent::Message(envelope),
        Err(e) => TransportEvent::Malformed(e),
    };
    bridge.handle_event(event).into_iter().flat_map(|e| app.handle(e)).collect()
}

fn private_frame(from: &str, to: &str, content: &str) -> String {
    serde_json::json!({"type": "private", "from": from, "to": to, "content": content}).to_string()
}

fn group_frame(from: &str, group: &str, content: &str) -> String {
    serde_json::json!({"type": "group_message", "from": from, "group_name": group, "content": content})
        .to_string()
}

#[test]
fn register_sets_identity_from_last_word() {
    let app = registered_app("alice");

    assert_eq!(app.my_name(), Some("alice"));
    assert_eq!(app.connection_state(), ConnectionState::Registered);
}

#[test]
fn private_echo_appears_once() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let _ = app.open_private_chat("bob");
    let actions = app.send_message("hi");
    let sent = process_actions(&mut bridge, actions);
    assert_eq!(sent, [Envelope::text(&ChatTarget::Private("bob".into()), "hi")]);

    // Server broadcasts the message back to its sender
    let _ = receive(&mut app, &mut bridge, &private_frame("alice", "bob", "hi"));

    let bob = ChatTarget::Private("bob".into());
    assert_eq!(app.messages(&bob).len(), 1);
    assert_eq!(app.messages(&bob)[0].from, "alice");
    assert_eq!(app.messages(&bob)[0].body, MessageBody::Text("hi".into()));
    assert_eq!(app.unread_count(&bob), 0);
}

#[test]
fn group_message_to_closed_conversation_counts_unread() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();
    let _ = app.open_private_chat("bob");

    let _ = receive(&mut app, &mut bridge, &group_frame("carol", "g1", "hello"));

    let g1 = ChatTarget::Group("g1".into());
    assert_eq!(app.unread_count(&g1), 1);
    assert_eq!(g1.conversation_key(), "group_g1");
    assert_eq!(app.messages(&g1).len(), 1);
    assert!(app.current_messages().is_empty());
}

#[test]
fn user_named_like_group_key_does_not_collide() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let _ = receive(&mut app, &mut bridge, &private_frame("group_g1", "alice", "sneaky"));
    let _ = receive(&mut app, &mut bridge, &group_frame("bob", "g1", "real"));

    assert_eq!(app.messages(&ChatTarget::Private("group_g1".into())).len(), 1);
    assert_eq!(app.messages(&ChatTarget::Group("g1".into())).len(), 1);
}

#[test]
fn client_list_replaces_roster() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let _ = receive(&mut app, &mut bridge, r#"{"type":"client_list","clients":["alice","bob","carol"]}"#);
    let _ = receive(&mut app, &mut bridge, r#"{"type":"client_list","clients":["alice"]}"#);
    assert_eq!(app.users(), ["alice"]);

    let _ = receive(&mut app, &mut bridge, r#"{"type":"client_list"}"#);
    assert!(app.users().is_empty());
}

#[test]
fn group_list_replaces_groups() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let first = r#"{"type":"group_list","groups":[
        {"name":"g1","members":["alice"]},
        {"name":"g2","members":["bob"],"creator":"bob"}
    ]}"#;
    let _ = receive(&mut app, &mut bridge, first);
    assert_eq!(app.groups().len(), 2);
    assert_eq!(app.groups()[1].creator.as_deref(), Some("bob"));

    let _ = receive(&mut app, &mut bridge, r#"{"type":"group_list","groups":[{"name":"g3","members":[]}]}"#);
    let names: Vec<_> = app.groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["g3"]);
}

#[test]
fn file_from_peer_is_logged() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let frame = serde_json::json!({
        "type": "file_private",
        "from": "bob",
        "to": "alice",
        "file": {"name": "main.c", "content": "int main;", "size": 9, "type": "text/x-c"}
    });
    let _ = receive(&mut app, &mut bridge, &frame.to_string());

    let bob = ChatTarget::Private("bob".into());
    assert_eq!(app.unread_count(&bob), 1);
    assert!(matches!(&app.messages(&bob)[0].body, MessageBody::File(f) if f.name == "main.c" && f.size == 9));
}

#[test]
fn sending_file_to_group_uses_group_name() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();
    let _ = app.open_group_chat("g1");

    let file = talkie_proto::FileAttachment::new("notes.md", "# hi\n", "text/markdown");
    let actions = app.send_file(file.clone());
    let sent = process_actions(&mut bridge, actions);

    assert_eq!(sent, [Envelope::file(&ChatTarget::Group("g1".into()), file)]);
    let wire: serde_json::Value = serde_json::from_str(&sent[0].encode().unwrap()).unwrap();
    assert_eq!(wire["group_name"], "g1");
    assert!(wire.get("to").is_none());
}

#[test]
fn duplicate_group_rejected_without_frame() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();
    let _ = receive(&mut app, &mut bridge, r#"{"type":"group_list","groups":[{"name":"Team","members":["bob"]}]}"#);

    let actions = app.create_group("team");
    assert!(process_actions(&mut bridge, actions).is_empty());
    assert_eq!(
        app.notification().map(|n| (n.level, n.message.as_str())),
        Some((NotificationLevel::Error, "Group name already exists"))
    );

    let actions = app.create_group("Team2");
    assert_eq!(process_actions(&mut bridge, actions), [Envelope::create_group("Team2")]);
}

#[test]
fn join_and_leave_are_plain_intents() {
    let app = registered_app("alice");
    let mut bridge = Bridge::new();

    let mut actions = app.join_group("g1");
    actions.extend(app.leave_group(" g2 "));
    actions.extend(app.join_group(""));

    assert_eq!(process_actions(&mut bridge, actions), [
        Envelope::join_group("g1"),
        Envelope::leave_group("g2"),
    ]);
    assert!(app.groups().is_empty());
}

#[test]
fn server_error_is_not_fatal() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let _ = receive(&mut app, &mut bridge, r#"{"type":"error","error":"Group already exists"}"#);
    assert_eq!(app.notification().map(|n| n.message.as_str()), Some("Group already exists"));

    let _ = receive(&mut app, &mut bridge, &private_frame("bob", "alice", "still here"));
    assert_eq!(app.unread_count(&ChatTarget::Private("bob".into())), 1);
}

#[test]
fn malformed_frame_notifies_and_continues() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let _ = receive(&mut app, &mut bridge, r#"{"type":"private","from":"bob""#);
    assert_eq!(app.notification().map(|n| n.level), Some(NotificationLevel::Error));

    let _ = receive(&mut app, &mut bridge, r#"{"type":"telepathy"}"#);
    let _ = receive(&mut app, &mut bridge, &private_frame("bob", "alice", "ok"));
    assert_eq!(app.messages(&ChatTarget::Private("bob".into())).len(), 1);
    assert!(app.is_registered());
}

#[test]
fn duplicate_login_keeps_session() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let actions = receive(&mut app, &mut bridge, r#"{"type":"duplicate_login"}"#);
    assert!(!actions.iter().any(|a| matches!(a, AppAction::ScheduleTeardown { .. })));
    assert_eq!(
        app.notification().map(|n| (n.level, n.message.as_str())),
        Some((NotificationLevel::Warning, "This account is being logged in from another location"))
    );
    assert!(app.is_registered());
}

#[test]
fn name_in_use_close_stops_processing() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();

    let events = bridge.handle_event(TransportEvent::Closed { code: 4001 });
    let actions: Vec<_> = events.into_iter().flat_map(|e| app.handle(e)).collect();

    assert!(actions.iter().any(|a| matches!(a, AppAction::ScheduleTeardown { .. })));
    assert_eq!(
        app.notification().map(|n| (n.level, n.message.as_str())),
        Some((NotificationLevel::Warning, "This name is already in use"))
    );

    // Nothing after teardown begins is applied
    let _ = receive(&mut app, &mut bridge, &private_frame("bob", "alice", "late"));
    let _ = receive(&mut app, &mut bridge, r#"{"type":"client_list","clients":["bob"]}"#);
    assert!(app.messages(&ChatTarget::Private("bob".into())).is_empty());
    assert!(app.users().is_empty());

    let _ = app.handle(AppEvent::TeardownElapsed);
    assert_eq!(app.my_name(), None);
}

#[test]
fn teardown_discards_everything() {
    let mut app = registered_app("alice");
    let mut bridge = Bridge::new();
    let _ = receive(&mut app, &mut bridge, r#"{"type":"client_list","clients":["alice","bob"]}"#);
    let _ = receive(&mut app, &mut bridge, &private_frame("bob", "alice", "hi"));
    let _ = app.open_private_chat("bob");
    let _ = receive(&mut app, &mut bridge, r#"{"type":"kicked"}"#);

    let actions = app.handle(AppEvent::TeardownElapsed);

    assert!(actions.contains(&AppAction::Quit));
    assert!(app.users().is_empty());
    assert!(app.groups().is_empty());
    assert!(app.current_chat().is_none());
    assert!(app.conversations().is_empty());
    assert_eq!(app.connection_state(), ConnectionState::Disconnected);
}

#[test]
fn group_roster_drives_membership_view() {
    let mut app = registered_app("alice");
    let _ = app.handle(AppEvent::GroupsUpdated {
        groups: vec![
            Group::new("mine", ["bob".to_string(), "alice".to_string()]),
            Group::new("theirs", ["bob".to_string()]),
        ],
    });

    assert!(app.groups()[0].has_member("alice"));
    assert_eq!(app.my_groups().count(), 1);
}
