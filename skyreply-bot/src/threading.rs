//! Reply reference construction.

use skyreply_sdk::record::{ReplyRef, StrongRef};

use crate::dispatch::CreatedPost;

/// Compute the (parent, root) pair for the bot's reply.
///
/// Parent is always the triggering post itself — the bot answers the post
/// that mentioned it, not that post's parent. Root is copied verbatim
/// from the triggering post's own reply descriptor when it has one;
/// a post that starts a thread is its own root.
pub fn build_references(post: &CreatedPost) -> ReplyRef {
    let parent = StrongRef {
        uri: post.uri.clone(),
        cid: post.cid.clone(),
    };
    let root = match &post.record.reply {
        Some(reply) => reply.root.clone(),
        None => parent.clone(),
    };
    ReplyRef { parent, root }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyreply_sdk::record::PostRecord;

    fn created(record: PostRecord) -> CreatedPost {
        CreatedPost {
            uri: "at://did:plc:alice/app.bsky.feed.post/3k".to_string(),
            cid: "cidSelf".to_string(),
            author: "did:plc:alice".to_string(),
            record,
        }
    }

    #[test]
    fn top_level_post_is_its_own_root() {
        let refs = build_references(&created(PostRecord::default()));
        assert_eq!(refs.parent, refs.root);
        assert_eq!(refs.parent.uri, "at://did:plc:alice/app.bsky.feed.post/3k");
        assert_eq!(refs.parent.cid, "cidSelf");
    }

    #[test]
    fn existing_root_is_copied_verbatim() {
        let existing = ReplyRef {
            parent: StrongRef { uri: "at://a/p/1".to_string(), cid: "cidA".to_string() },
            root: StrongRef { uri: "at://r/p/0".to_string(), cid: "cidR".to_string() },
        };
        let record = PostRecord { reply: Some(existing), ..Default::default() };
        let refs = build_references(&created(record));
        // Reply to the mentioning post, keep its thread's root.
        assert_eq!(refs.parent.uri, "at://did:plc:alice/app.bsky.feed.post/3k");
        assert_eq!(refs.parent.cid, "cidSelf");
        assert_eq!(refs.root.uri, "at://r/p/0");
        assert_eq!(refs.root.cid, "cidR");
    }
}
