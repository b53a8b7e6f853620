//! In-process model of the chat server.
//!
//! `SimServer` keeps the registry of online users and groups and computes
//! which envelopes each request fans out to. It performs no I/O: callers get
//! a list of [`Delivery`] values and route them to their sessions.
//!
//! Routing follows the production server:
//! - Registration replies with `Registered as <name>` and broadcasts both
//!   rosters to everyone.
//! - Private messages and files go to the recipient and back to the sender.
//! - Group messages and files go to every member, the sender included.
//! - Group creation, joins and leaves broadcast the full group list.
//! - A taken or blank name is refused with close code 4001.

use std::collections::{BTreeMap, BTreeSet};

use talkie_proto::{CLOSE_NAME_IN_USE, Envelope, Group};

/// An envelope addressed to one online user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient session name.
    pub to: String,
    /// Envelope as the recipient receives it.
    pub envelope: Envelope,
}

#[derive(Debug, Clone)]
struct SimGroup {
    creator: String,
    members: BTreeSet<String>,
}

/// Simulated chat server.
#[derive(Debug, Default)]
pub struct SimServer {
    users: BTreeSet<String>,
    groups: BTreeMap<String, SimGroup>,
}

impl SimServer {
    /// Create a server with nobody online.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `name`.
    ///
    /// # Errors
    ///
    /// Returns the close code the server ends the connection with when the
    /// name is blank or already online.
    pub fn register(&mut self, name: &str) -> Result<Vec<Delivery>, u16> {
        let name = name.trim();
        if name.is_empty() || self.users.contains(name) {
            tracing::debug!(%name, "registration refused");
            return Err(CLOSE_NAME_IN_USE);
        }

        self.users.insert(name.to_string());
        let mut out = vec![Delivery {
            to: name.to_string(),
            envelope: Envelope::Register { content: format!("Registered as {name}") },
        }];
        out.extend(self.broadcast(&self.client_list()));
        out.extend(self.broadcast(&self.group_list()));
        Ok(out)
    }

    /// Drop the session of `name`, removing it from every group.
    pub fn disconnect(&mut self, name: &str) -> Vec<Delivery> {
        if !self.users.remove(name) {
            return vec![];
        }
        for group in self.groups.values_mut() {
            group.members.remove(name);
        }

        let mut out = self.broadcast(&self.client_list());
        out.extend(self.broadcast(&self.group_list()));
        out
    }

    /// Handle a request from the online user `from`.
    ///
    /// The sender is stamped on every relayed message. Requests from users
    /// who are not online produce nothing.
    pub fn handle(&mut self, from: &str, envelope: Envelope) -> Vec<Delivery> {
        if !self.users.contains(from) {
            tracing::debug!(%from, kind = envelope.kind(), "request from unknown session");
            return vec![];
        }
        let sender = Some(from.to_string());

        match envelope {
            Envelope::Private(mut msg) => {
                let to = msg.to.clone();
                msg.from = sender;
                self.to_pair(from, to.as_deref(), &Envelope::Private(msg))
            },
            Envelope::FilePrivate(mut msg) => {
                let to = msg.to.clone();
                msg.from = sender;
                self.to_pair(from, to.as_deref(), &Envelope::FilePrivate(msg))
            },
            Envelope::GroupMessage(mut msg) => {
                let group = msg.group_name.clone();
                msg.from = sender;
                self.to_group(&group, &Envelope::GroupMessage(msg))
            },
            Envelope::FileGroup(mut msg) => {
                let group = msg.group_name.clone();
                msg.from = sender;
                self.to_group(&group, &Envelope::FileGroup(msg))
            },
            Envelope::CreateGroup { group_name } => {
                self.groups.entry(group_name).or_insert_with(|| SimGroup {
                    creator: from.to_string(),
                    members: BTreeSet::from([from.to_string()]),
                });
                self.broadcast(&self.group_list())
            },
            Envelope::JoinGroup { group_name } => {
                if let Some(group) = self.groups.get_mut(&group_name) {
                    group.members.insert(from.to_string());
                }
                self.broadcast(&self.group_list())
            },
            Envelope::LeaveGroup { group_name } => {
                if let Some(group) = self.groups.get_mut(&group_name) {
                    group.members.remove(from);
                }
                self.broadcast(&self.group_list())
            },
            other => {
                tracing::debug!(kind = other.kind(), "ignoring client-sent server envelope");
                vec![]
            },
        }
    }

    /// Online users, sorted.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    /// Whether `name` is online.
    pub fn is_online(&self, name: &str) -> bool {
        self.users.contains(name)
    }

    /// Members of `group`, if it exists.
    pub fn members(&self, group: &str) -> Option<impl Iterator<Item = &str>> {
        self.groups.get(group).map(|g| g.members.iter().map(String::as_str))
    }

    /// Current `client_list` envelope.
    pub fn client_list(&self) -> Envelope {
        Envelope::ClientList { clients: self.users.iter().cloned().collect() }
    }

    /// Current `group_list` envelope.
    pub fn group_list(&self) -> Envelope {
        let groups = self
            .groups
            .iter()
            .map(|(name, group)| Group {
                name: name.clone(),
                creator: Some(group.creator.clone()),
                members: group.members.iter().cloned().collect(),
            })
            .collect();
        Envelope::GroupList { groups }
    }

    fn broadcast(&self, envelope: &Envelope) -> Vec<Delivery> {
        self.users.iter().map(|to| Delivery { to: to.clone(), envelope: envelope.clone() }).collect()
    }

    fn to_pair(&self, from: &str, to: Option<&str>, envelope: &Envelope) -> Vec<Delivery> {
        let mut out = Vec::with_capacity(2);
        if let Some(to) = to.filter(|to| self.users.contains(*to)) {
            out.push(Delivery { to: to.to_string(), envelope: envelope.clone() });
        }
        if to != Some(from) {
            out.push(Delivery { to: from.to_string(), envelope: envelope.clone() });
        }
        out
    }

    fn to_group(&self, group: &str, envelope: &Envelope) -> Vec<Delivery> {
        let Some(group) = self.groups.get(group) else {
            return vec![];
        };
        group
            .members
            .iter()
            .filter(|member| self.users.contains(*member))
            .map(|member| Delivery { to: member.clone(), envelope: envelope.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use talkie_proto::{ChatTarget, DirectMessage};

    use super::*;

    fn to(deliveries: &[Delivery], user: &str) -> Vec<Envelope> {
        deliveries.iter().filter(|d| d.to == user).map(|d| d.envelope.clone()).collect()
    }

    #[test]
    fn register_replies_and_broadcasts_roster() {
        let mut server = SimServer::new();
        server.register("bob").unwrap();
        let out = server.register("alice").unwrap();

        let alice = to(&out, "alice");
        assert_eq!(alice[0], Envelope::Register { content: "Registered as alice".into() });
        assert!(alice.contains(&Envelope::ClientList {
            clients: vec!["alice".into(), "bob".into()]
        }));
        assert_eq!(to(&out, "bob").len(), 2);
    }

    #[test]
    fn taken_or_blank_name_refused() {
        let mut server = SimServer::new();
        server.register("alice").unwrap();

        assert_eq!(server.register("alice"), Err(CLOSE_NAME_IN_USE));
        assert_eq!(server.register("  "), Err(CLOSE_NAME_IN_USE));
    }

    #[test]
    fn private_echoed_to_sender_with_from() {
        let mut server = SimServer::new();
        server.register("alice").unwrap();
        server.register("bob").unwrap();

        let out = server.handle("alice", Envelope::text(&ChatTarget::Private("bob".into()), "hi"));
        let expected = Envelope::Private(DirectMessage {
            from: Some("alice".into()),
            to: Some("bob".into()),
            content: "hi".into(),
        });
        assert_eq!(to(&out, "bob"), vec![expected.clone()]);
        assert_eq!(to(&out, "alice"), vec![expected]);
    }

    #[test]
    fn group_lifecycle() {
        let mut server = SimServer::new();
        server.register("alice").unwrap();
        server.register("bob").unwrap();

        server.handle("alice", Envelope::create_group("team"));
        server.handle("bob", Envelope::join_group("team"));
        let members: Vec<_> = server.members("team").unwrap().collect();
        assert_eq!(members, ["alice", "bob"]);

        let out = server.handle("bob", Envelope::text(&ChatTarget::Group("team".into()), "yo"));
        assert_eq!(out.len(), 2);

        server.handle("bob", Envelope::leave_group("team"));
        let Envelope::GroupList { groups } = server.group_list() else { unreachable!() };
        assert_eq!(groups[0].creator.as_deref(), Some("alice"));
        assert_eq!(groups[0].members, vec!["alice".to_string()]);
    }

    #[test]
    fn create_existing_group_keeps_creator() {
        let mut server = SimServer::new();
        server.register("alice").unwrap();
        server.register("bob").unwrap();

        server.handle("alice", Envelope::create_group("team"));
        server.handle("bob", Envelope::create_group("team"));
        let members: Vec<_> = server.members("team").unwrap().collect();
        assert_eq!(members, ["alice"]);
    }

    #[test]
    fn disconnect_leaves_groups() {
        let mut server = SimServer::new();
        server.register("alice").unwrap();
        server.register("bob").unwrap();
        server.handle("alice", Envelope::create_group("team"));
        server.handle("bob", Envelope::join_group("team"));

        let out = server.disconnect("bob");
        assert!(!server.is_online("bob"));
        assert_eq!(to(&out, "alice"), vec![server.client_list(), server.group_list()]);
        assert_eq!(server.members("team").unwrap().count(), 1);
    }

    #[test]
    fn unknown_sender_ignored() {
        let mut server = SimServer::new();
        let out = server.handle("ghost", Envelope::create_group("team"));
        assert!(out.is_empty());
        assert!(server.members("team").is_none());
    }
}
