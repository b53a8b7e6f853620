//! Property-based tests for envelope decoding.
//!
//! Decoding must never panic on arbitrary input, and every envelope the
//! client can build must survive an encode/decode pass unchanged.

use proptest::prelude::*;
use talkie_proto::{ChatTarget, Envelope, FileAttachment, ProtocolError};

fn name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

fn target() -> impl Strategy<Value = ChatTarget> {
    prop_oneof![name().prop_map(ChatTarget::Private), name().prop_map(ChatTarget::Group),]
}

/// Envelopes the client itself emits.
fn outgoing() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        name().prop_map(Envelope::register),
        (target(), ".{0,64}").prop_map(|(t, c)| Envelope::text(&t, c)),
        (target(), name(), ".{0,256}")
            .prop_map(|(t, n, c)| Envelope::file(&t, FileAttachment::new(n, c, "text/plain"))),
        name().prop_map(Envelope::join_group),
        name().prop_map(Envelope::leave_group),
        name().prop_map(Envelope::create_group),
    ]
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in ".{0,256}") {
        let _ = Envelope::decode(&text);
    }

    #[test]
    fn prop_outgoing_survives_wire(env in outgoing()) {
        let text = env.encode().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(Envelope::decode(&text), Ok(env));
    }

    #[test]
    fn prop_unknown_types_rejected(kind in "[a-z]{3,12}") {
        let known = [
            "register", "error", "kicked", "private", "file_group", "file_private",
            "join_group", "leave_group", "client_list", "group_list", "create_group",
            "group_message", "duplicate_login",
        ];
        prop_assume!(!known.contains(&kind.as_str()));

        let text = format!(r#"{{"type":"{kind}"}}"#);
        prop_assert!(matches!(Envelope::decode(&text), Err(ProtocolError::Decode(_))));
    }
}
