//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] sits between the transport and the [`crate::App`].
//!
//! # Responsibilities
//!
//! - Classifies each incoming [`TransportEvent`] by envelope type and turns
//!   it into [`crate::AppEvent`]s.
//! - Converts protocol [`crate::AppAction`]s into [`Envelope`]s and
//!   accumulates them for the driver to send in the next I/O cycle.

use talkie_client::TransportEvent;
use talkie_proto::{ChatTarget, Envelope};

use crate::{AppAction, AppEvent, MessageBody};

/// Bridge between App and the wire protocol.
#[derive(Debug, Default)]
pub struct Bridge {
    outgoing: Vec<Envelope>,
}

impl Bridge {
    /// Create a bridge with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the envelope for a protocol action. Other actions are ignored.
    pub fn process_app_action(&mut self, action: AppAction) {
        let envelope = match action {
            AppAction::SendMessage { target, content } => Envelope::text(&target, content),
            AppAction::SendFile { target, file } => Envelope::file(&target, file),
            AppAction::JoinGroup { name } => Envelope::join_group(name),
            AppAction::LeaveGroup { name } => Envelope::leave_group(name),
            AppAction::CreateGroup { name } => Envelope::create_group(name),
            AppAction::Render
            | AppAction::Quit
            | AppAction::Connect { .. }
            | AppAction::ScheduleDismiss { .. }
            | AppAction::ScheduleTeardown { .. }
            | AppAction::CloseTransport => return,
        };
        tracing::debug!(kind = envelope.kind(), "queueing envelope");
        self.outgoing.push(envelope);
    }

    /// Take pending outgoing envelopes.
    pub fn take_outgoing(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outgoing)
    }

    /// Translate a transport event.
    pub fn handle_event(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        match event {
            TransportEvent::Message(envelope) => self.handle_envelope(envelope),
            TransportEvent::Malformed(error) => {
                tracing::warn!(%error, "malformed frame");
                vec![AppEvent::MalformedFrame { error: error.to_string() }]
            },
            TransportEvent::Error(message) => vec![AppEvent::TransportFailed { message }],
            TransportEvent::Closed { code } => vec![AppEvent::ConnectionClosed { code }],
        }
    }

    /// Classify one server envelope.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Vec<AppEvent> {
        tracing::debug!(kind = envelope.kind(), "envelope received");

        let event = match envelope {
            Envelope::Register { content } => match content.split_whitespace().next_back() {
                Some(name) => AppEvent::Registered { name: name.to_string() },
                None => {
                    tracing::warn!("register reply without a name");
                    return vec![];
                },
            },
            Envelope::Error { error } => {
                AppEvent::ServerError { message: Some(error).filter(|e| !e.is_empty()) }
            },
            Envelope::DuplicateLogin => AppEvent::DuplicateLogin,
            Envelope::Kicked => AppEvent::Kicked,
            Envelope::ClientList { clients } => AppEvent::UsersUpdated { users: clients },
            Envelope::GroupList { groups } => AppEvent::GroupsUpdated { groups },
            Envelope::Private(msg) => {
                let Some(from) = msg.from else {
                    tracing::warn!("private message without sender");
                    return vec![];
                };
                let target = ChatTarget::Private(from.clone());
                AppEvent::MessageReceived { target, from, body: MessageBody::from_content(msg.content) }
            },
            Envelope::FilePrivate(msg) => {
                let Some(from) = msg.from else {
                    tracing::warn!("private file without sender");
                    return vec![];
                };
                let target = ChatTarget::Private(from.clone());
                AppEvent::MessageReceived { target, from, body: MessageBody::File(msg.file) }
            },
            Envelope::GroupMessage(msg) => {
                let Some(from) = msg.from else {
                    tracing::warn!(group = %msg.group_name, "group message without sender");
                    return vec![];
                };
                let target = ChatTarget::Group(msg.group_name);
                AppEvent::MessageReceived { target, from, body: MessageBody::from_content(msg.content) }
            },
            Envelope::FileGroup(msg) => {
                let Some(from) = msg.from else {
                    tracing::warn!(group = %msg.group_name, "group file without sender");
                    return vec![];
                };
                let target = ChatTarget::Group(msg.group_name);
                AppEvent::MessageReceived { target, from, body: MessageBody::File(msg.file) }
            },
            Envelope::JoinGroup { .. } | Envelope::LeaveGroup { .. } | Envelope::CreateGroup { .. } => {
                tracing::warn!(kind = envelope.kind(), "client-only envelope from server");
                return vec![];
            },
        };
        vec![event]
    }
}

#[cfg(test)]
mod tests {
    use talkie_proto::{DirectMessage, FileAttachment, GroupFile, ProtocolError};

    use super::*;

    #[test]
    fn register_takes_last_word() {
        let mut bridge = Bridge::new();
        let events =
            bridge.handle_envelope(Envelope::Register { content: "Registered as  alice \n".into() });
        assert_eq!(events, [AppEvent::Registered { name: "alice".into() }]);

        assert!(bridge.handle_envelope(Envelope::Register { content: "  ".into() }).is_empty());
    }

    #[test]
    fn private_keyed_by_sender() {
        let mut bridge = Bridge::new();
        let msg = DirectMessage { from: Some("bob".into()), to: Some("alice".into()), content: "hi".into() };
        let events = bridge.handle_envelope(Envelope::Private(msg));

        assert_eq!(events, [AppEvent::MessageReceived {
            target: ChatTarget::Private("bob".into()),
            from: "bob".into(),
            body: MessageBody::Text("hi".into()),
        }]);
    }

    #[test]
    fn private_without_sender_dropped() {
        let mut bridge = Bridge::new();
        let msg = DirectMessage { from: None, to: Some("alice".into()), content: "hi".into() };
        assert!(bridge.handle_envelope(Envelope::Private(msg)).is_empty());
    }

    #[test]
    fn group_file_keyed_by_group() {
        let mut bridge = Bridge::new();
        let file = FileAttachment::new("a.rs", "fn main() {}", "text/x-rust");
        let msg = GroupFile { from: Some("bob".into()), group_name: "g1".into(), file: file.clone() };
        let events = bridge.handle_envelope(Envelope::FileGroup(msg));

        assert_eq!(events, [AppEvent::MessageReceived {
            target: ChatTarget::Group("g1".into()),
            from: "bob".into(),
            body: MessageBody::File(file),
        }]);
    }

    #[test]
    fn empty_error_becomes_none() {
        let mut bridge = Bridge::new();
        let events = bridge.handle_envelope(Envelope::Error { error: String::new() });
        assert_eq!(events, [AppEvent::ServerError { message: None }]);
    }

    #[test]
    fn transport_events() {
        let mut bridge = Bridge::new();
        assert_eq!(bridge.handle_event(TransportEvent::Closed { code: 4001 }), [
            AppEvent::ConnectionClosed { code: 4001 }
        ]);
        assert!(matches!(
            bridge.handle_event(TransportEvent::Malformed(ProtocolError::EmptyFrame)).as_slice(),
            [AppEvent::MalformedFrame { .. }]
        ));
        assert!(matches!(
            bridge.handle_event(TransportEvent::Error("reset".into())).as_slice(),
            [AppEvent::TransportFailed { .. }]
        ));
    }

    #[test]
    fn actions_become_envelopes() {
        let mut bridge = Bridge::new();
        bridge.process_app_action(AppAction::SendMessage {
            target: ChatTarget::Group("g1".into()),
            content: "hey".into(),
        });
        bridge.process_app_action(AppAction::Render);
        bridge.process_app_action(AppAction::CreateGroup { name: "rustaceans".into() });

        let out = bridge.take_outgoing();
        assert_eq!(out, [
            Envelope::text(&ChatTarget::Group("g1".into()), "hey"),
            Envelope::create_group("rustaceans"),
        ]);
        assert!(bridge.take_outgoing().is_empty());
    }
}
