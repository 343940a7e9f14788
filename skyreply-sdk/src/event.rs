//! Events emitted by the firehose subscription for the bot to consume.
//!
//! Jetstream frames are a loose tagged union on the wire; they are decoded
//! here into an explicit sum type so consumers match on variants instead
//! of probing optional fields.

use serde::Deserialize;

/// A repository event delivered by the firehose.
#[derive(Debug, Clone)]
pub enum FirehoseEvent {
    /// A record was created in `did`'s repository.
    Create {
        did: String,
        collection: String,
        rkey: String,
        cid: String,
        record: serde_json::Value,
    },

    /// An existing record was rewritten.
    Update {
        did: String,
        collection: String,
        rkey: String,
        cid: String,
        record: serde_json::Value,
    },

    /// A record was deleted.
    Delete {
        did: String,
        collection: String,
        rkey: String,
    },

    /// A handle or DID document changed.
    Identity {
        did: String,
        handle: Option<String>,
    },

    /// Account status changed (takedown, deactivation, reactivation).
    Account {
        did: String,
        active: bool,
    },
}

impl FirehoseEvent {
    /// The `at://` URI of the record this event concerns, when it has one.
    pub fn record_uri(&self) -> Option<String> {
        match self {
            FirehoseEvent::Create { did, collection, rkey, .. }
            | FirehoseEvent::Update { did, collection, rkey, .. }
            | FirehoseEvent::Delete { did, collection, rkey } => {
                Some(format!("at://{did}/{collection}/{rkey}"))
            }
            _ => None,
        }
    }

    /// Decode one Jetstream JSON frame. Returns `None` for frames that are
    /// malformed or of a kind/operation we don't model — expected noise on
    /// a public firehose, not an error.
    pub fn parse(frame: &str) -> Option<FirehoseEvent> {
        let wire: WireFrame = serde_json::from_str(frame).ok()?;
        match wire.kind.as_str() {
            "commit" => {
                let did = wire.did?;
                let commit = wire.commit?;
                match commit.operation.as_str() {
                    "create" => Some(FirehoseEvent::Create {
                        did,
                        collection: commit.collection,
                        rkey: commit.rkey,
                        cid: commit.cid?,
                        record: commit.record?,
                    }),
                    "update" => Some(FirehoseEvent::Update {
                        did,
                        collection: commit.collection,
                        rkey: commit.rkey,
                        cid: commit.cid?,
                        record: commit.record?,
                    }),
                    "delete" => Some(FirehoseEvent::Delete {
                        did,
                        collection: commit.collection,
                        rkey: commit.rkey,
                    }),
                    _ => None,
                }
            }
            "identity" => {
                let identity = wire.identity?;
                Some(FirehoseEvent::Identity {
                    did: identity.did,
                    handle: identity.handle,
                })
            }
            "account" => {
                let account = wire.account?;
                Some(FirehoseEvent::Account {
                    did: account.did,
                    active: account.active,
                })
            }
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct WireFrame {
    #[serde(default)]
    did: Option<String>,
    kind: String,
    #[serde(default)]
    commit: Option<WireCommit>,
    #[serde(default)]
    identity: Option<WireIdentity>,
    #[serde(default)]
    account: Option<WireAccount>,
}

#[derive(Deserialize)]
struct WireCommit {
    operation: String,
    collection: String,
    rkey: String,
    #[serde(default)]
    cid: Option<String>,
    #[serde(default)]
    record: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct WireIdentity {
    did: String,
    #[serde(default)]
    handle: Option<String>,
}

#[derive(Deserialize)]
struct WireAccount {
    did: String,
    active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_commit() {
        let frame = r#"{
            "did": "did:plc:alice",
            "time_us": 1725911162329308,
            "kind": "commit",
            "commit": {
                "rev": "3l3qo2vutsw2a",
                "operation": "create",
                "collection": "app.bsky.feed.post",
                "rkey": "3l3qo2vutsw2b",
                "record": {"text": "hi", "createdAt": "2025-01-01T00:00:00Z"},
                "cid": "bafyreiabc"
            }
        }"#;
        let event = FirehoseEvent::parse(frame).unwrap();
        match &event {
            FirehoseEvent::Create { did, collection, cid, record, .. } => {
                assert_eq!(did, "did:plc:alice");
                assert_eq!(collection, "app.bsky.feed.post");
                assert_eq!(cid, "bafyreiabc");
                assert_eq!(record["text"], "hi");
            }
            other => panic!("expected Create, got {other:?}"),
        }
        assert_eq!(
            event.record_uri().unwrap(),
            "at://did:plc:alice/app.bsky.feed.post/3l3qo2vutsw2b"
        );
    }

    #[test]
    fn parses_delete_commit() {
        let frame = r#"{
            "did": "did:plc:alice",
            "kind": "commit",
            "commit": {"operation": "delete", "collection": "app.bsky.feed.post", "rkey": "3k"}
        }"#;
        assert!(matches!(
            FirehoseEvent::parse(frame),
            Some(FirehoseEvent::Delete { .. })
        ));
    }

    #[test]
    fn parses_identity_and_account() {
        let identity = r#"{"did": "did:plc:a", "kind": "identity",
            "identity": {"did": "did:plc:a", "handle": "alice.bsky.social", "seq": 1}}"#;
        assert!(matches!(
            FirehoseEvent::parse(identity),
            Some(FirehoseEvent::Identity { handle: Some(h), .. }) if h == "alice.bsky.social"
        ));

        let account = r#"{"did": "did:plc:a", "kind": "account",
            "account": {"did": "did:plc:a", "active": false, "seq": 2}}"#;
        assert!(matches!(
            FirehoseEvent::parse(account),
            Some(FirehoseEvent::Account { active: false, .. })
        ));
    }

    #[test]
    fn create_without_record_is_dropped() {
        let frame = r#"{
            "did": "did:plc:a",
            "kind": "commit",
            "commit": {"operation": "create", "collection": "app.bsky.feed.post", "rkey": "3k"}
        }"#;
        assert!(FirehoseEvent::parse(frame).is_none());
    }

    #[test]
    fn unknown_kind_and_garbage_are_dropped() {
        assert!(FirehoseEvent::parse(r#"{"kind": "sync"}"#).is_none());
        assert!(FirehoseEvent::parse("not json at all").is_none());
    }
}
