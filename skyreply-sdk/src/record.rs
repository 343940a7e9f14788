//! AT Protocol record types for `app.bsky.feed.post`.
//!
//! Only the fields the bot actually reads are modeled. Rich-text features
//! are a closed variant set so mention detection never needs untyped
//! field access; anything we don't recognize decodes as `Other`.

use serde::{Deserialize, Serialize};

/// NSID of the post record collection.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// An `app.bsky.feed.post` record as observed on the firehose.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub facets: Option<Vec<Facet>>,
    #[serde(default)]
    pub reply: Option<ReplyRef>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub langs: Option<Vec<String>>,
}

/// A rich-text annotation over a span of post text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Facet {
    #[serde(default)]
    pub features: Vec<FacetFeature>,
}

/// A single facet feature, tagged by its lexicon `$type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
    /// Any feature type we don't model.
    #[serde(other)]
    Other,
}

/// An immutable (uri, cid) pair identifying one revision of a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// Threading descriptor on a reply post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplyRef {
    pub parent: StrongRef,
    pub root: StrongRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mention_facet() {
        let json = r#"{
            "text": "@bot hello",
            "facets": [{
                "index": {"byteStart": 0, "byteEnd": 4},
                "features": [{"$type": "app.bsky.richtext.facet#mention", "did": "did:plc:bot"}]
            }],
            "createdAt": "2025-01-01T00:00:00Z"
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        let facets = record.facets.unwrap();
        assert!(matches!(
            &facets[0].features[0],
            FacetFeature::Mention { did } if did == "did:plc:bot"
        ));
    }

    #[test]
    fn unknown_feature_decodes_as_other() {
        let json = r#"{
            "text": "x",
            "facets": [{"features": [{"$type": "app.bsky.richtext.facet#future", "abc": 1}]}]
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        let facets = record.facets.unwrap();
        assert!(matches!(facets[0].features[0], FacetFeature::Other));
    }

    #[test]
    fn missing_facets_and_reply_are_none() {
        let record: PostRecord = serde_json::from_str(r#"{"text": "plain"}"#).unwrap();
        assert!(record.facets.is_none());
        assert!(record.reply.is_none());
    }

    #[test]
    fn decodes_reply_descriptor() {
        let json = r#"{
            "text": "a reply",
            "reply": {
                "parent": {"uri": "at://did:plc:a/app.bsky.feed.post/1", "cid": "cidA"},
                "root": {"uri": "at://did:plc:r/app.bsky.feed.post/0", "cid": "cidR"}
            }
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        let reply = record.reply.unwrap();
        assert_eq!(reply.root.cid, "cidR");
        assert_eq!(reply.parent.uri, "at://did:plc:a/app.bsky.feed.post/1");
    }
}
