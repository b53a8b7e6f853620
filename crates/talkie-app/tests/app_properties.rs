//! Property-based tests for the App state machine.
//!
//! Random interleavings of user intents and server traffic are applied to a
//! registered App alongside a small reference model; after every step the
//! observable state must match the model.

use std::collections::HashMap;

use proptest::prelude::*;
use talkie_app::{App, AppAction, AppEvent, ChatTarget, MessageBody};
use talkie_proto::Group;

const ME: &str = "me";

/// One step of a session.
#[derive(Debug, Clone)]
enum Step {
    /// User opens a conversation.
    Open(ChatTarget),
    /// User sends text to the open conversation; the server echoes it.
    SendWithEcho(String),
    /// A peer message arrives.
    Foreign { target: ChatTarget, from: String },
    /// Server replaces the roster.
    Users(Vec<String>),
    /// Server replaces the group list.
    Groups(Vec<String>),
}

fn peer() -> impl Strategy<Value = String> {
    prop_oneof![Just("bob".to_string()), Just("carol".to_string()), Just("dave".to_string())]
}

fn target() -> impl Strategy<Value = ChatTarget> {
    prop_oneof![
        peer().prop_map(ChatTarget::Private),
        prop_oneof![Just("g1"), Just("g2")].prop_map(|g| ChatTarget::Group(g.to_string())),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => target().prop_map(Step::Open),
        3 => "[a-z]{1,8}".prop_map(Step::SendWithEcho),
        4 => (target(), peer()).prop_map(|(target, from)| Step::Foreign { target, from }),
        1 => prop::collection::vec(peer(), 0..4).prop_map(Step::Users),
        1 => prop::collection::vec("[a-z]{3,6}", 0..4).prop_map(Step::Groups),
    ]
}

fn registered_app() -> App {
    let mut app = App::default();
    let _ = app.login(ME);
    let _ = app.handle(AppEvent::Registered { name: ME.into() });
    app
}

/// Reference model: what the user should see.
#[derive(Default)]
struct Model {
    open: Option<ChatTarget>,
    own_sent: HashMap<ChatTarget, usize>,
    total: HashMap<ChatTarget, usize>,
    unread: HashMap<ChatTarget, u32>,
}

fn apply(app: &mut App, model: &mut Model, step: Step) -> Vec<AppAction> {
    match step {
        Step::Open(target) => {
            model.unread.remove(&target);
            model.open = Some(target.clone());
            app.open_chat(target)
        },
        Step::SendWithEcho(text) => {
            let mut actions = app.send_message(&text);
            if let Some(open) = model.open.clone() {
                *model.own_sent.entry(open.clone()).or_default() += 1;
                *model.total.entry(open.clone()).or_default() += 1;

                let echo_target = match &open {
                    ChatTarget::Private(_) => ChatTarget::Private(ME.into()),
                    ChatTarget::Group(_) => open.clone(),
                };
                actions.extend(app.handle(AppEvent::MessageReceived {
                    target: echo_target,
                    from: ME.into(),
                    body: MessageBody::Text(text),
                }));
            }
            actions
        },
        Step::Foreign { target, from } => {
            *model.total.entry(target.clone()).or_default() += 1;
            if model.open.as_ref() != Some(&target) {
                *model.unread.entry(target.clone()).or_default() += 1;
            }
            app.handle(AppEvent::MessageReceived { target, from, body: MessageBody::Text("x".into()) })
        },
        Step::Users(users) => app.handle(AppEvent::UsersUpdated { users }),
        Step::Groups(names) => {
            let groups = names.into_iter().map(|n| Group::new(n, Vec::new())).collect();
            app.handle(AppEvent::GroupsUpdated { groups })
        },
    }
}

proptest! {
    #[test]
    fn prop_state_matches_model(steps in prop::collection::vec(step(), 0..60)) {
        let mut app = registered_app();
        let mut model = Model::default();

        for step in steps {
            let _ = apply(&mut app, &mut model, step);

            for (target, &expected) in &model.total {
                let log = app.messages(target);
                prop_assert_eq!(log.len(), expected, "log length of {}", target);

                let own = log.iter().filter(|m| m.from == ME).count();
                prop_assert_eq!(own, model.own_sent.get(target).copied().unwrap_or(0));
            }
            for target in app.conversations() {
                prop_assert_eq!(app.unread_count(target), model.unread.get(target).copied().unwrap_or(0));
            }
            prop_assert_eq!(app.current_chat(), model.open.as_ref());
            // Echo copies never create a conversation with ourselves
            prop_assert!(app.messages(&ChatTarget::Private(ME.into())).is_empty());
        }
    }

    #[test]
    fn prop_open_conversation_never_unread(steps in prop::collection::vec(step(), 0..60)) {
        let mut app = registered_app();
        let mut model = Model::default();

        for step in steps {
            let _ = apply(&mut app, &mut model, step);
            if let Some(open) = app.current_chat() {
                prop_assert_eq!(app.unread_count(open), 0);
            }
        }
    }

    #[test]
    fn prop_rosters_replaced_not_merged(
        first in prop::collection::vec(peer(), 0..5),
        second in prop::collection::vec(peer(), 0..5),
    ) {
        let mut app = registered_app();
        let _ = app.handle(AppEvent::UsersUpdated { users: first });
        let _ = app.handle(AppEvent::UsersUpdated { users: second.clone() });
        prop_assert_eq!(app.users(), second.as_slice());

        let groups: Vec<_> = second.iter().map(|n| Group::new(n.clone(), Vec::new())).collect();
        let _ = app.handle(AppEvent::GroupsUpdated { groups: vec![Group::new("old", Vec::new())] });
        let _ = app.handle(AppEvent::GroupsUpdated { groups: groups.clone() });
        prop_assert_eq!(app.groups(), groups.as_slice());
    }

    #[test]
    fn prop_invalid_group_names_never_sent(name in "\\PC{0,60}") {
        let mut app = registered_app();
        let _ = app.handle(AppEvent::GroupsUpdated { groups: vec![Group::new("Taken", Vec::new())] });

        let trimmed = name.trim();
        let len = trimmed.chars().count();
        let valid = (3..=50).contains(&len) && trimmed.to_lowercase() != "taken";

        let sent = app.create_group(&name).iter().any(AppAction::is_protocol);
        prop_assert_eq!(sent, valid);
    }
}
