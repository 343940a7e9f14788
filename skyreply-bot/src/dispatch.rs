//! Event classification and the per-mention reply pipeline.
//!
//! The dispatcher receives every firehose event and narrows it down:
//! only post creations by other accounts that decode cleanly and mention
//! the bot reach the pipeline. Failures anywhere downstream are logged
//! here and never stop processing of later events.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use skyreply_sdk::agent::{Agent, BotIdentity, ThreadView};
use skyreply_sdk::event::FirehoseEvent;
use skyreply_sdk::record::{PostRecord, ReplyRef, POST_COLLECTION};

use crate::llm::ChatBackend;
use crate::{compose, context, mention, threading};

/// A decoded post-creation event.
#[derive(Debug, Clone)]
pub struct CreatedPost {
    pub uri: String,
    pub cid: String,
    pub author: String,
    pub record: PostRecord,
}

/// The social-network API seam the pipeline depends on. The production
/// impl is the sdk [`Agent`]; tests substitute fakes.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Fetch the thread view for a post URI.
    async fn fetch_thread(&self, uri: &str) -> Result<ThreadView>;

    /// Publish a threaded reply into `repo`.
    async fn publish_reply(&self, repo: &str, text: &str, reply: &ReplyRef) -> Result<()>;
}

#[async_trait]
impl AgentApi for Agent {
    async fn fetch_thread(&self, uri: &str) -> Result<ThreadView> {
        Ok(self.get_post_thread(uri).await?)
    }

    async fn publish_reply(&self, repo: &str, text: &str, reply: &ReplyRef) -> Result<()> {
        self.create_post(repo, text, Some(reply)).await?;
        Ok(())
    }
}

/// Routes firehose events into the reply pipeline.
pub struct Dispatcher {
    api: Arc<dyn AgentApi>,
    llm: Arc<dyn ChatBackend>,
    identity: BotIdentity,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn AgentApi>, llm: Arc<dyn ChatBackend>, identity: BotIdentity) -> Self {
        Self { api, llm, identity }
    }

    /// Handle one delivered event. Never returns an error: anything the
    /// pipeline raises is logged and the event is dropped.
    pub async fn on_event(&self, event: FirehoseEvent) {
        let Some(uri) = event.record_uri() else {
            // identity / account events carry no record
            return;
        };
        let FirehoseEvent::Create { did, collection, cid, record, .. } = event else {
            return;
        };
        if collection != POST_COLLECTION {
            return;
        }
        // Never answer the bot's own posts.
        if did == self.identity.did {
            return;
        }
        // Undecodable records are firehose noise, dropped without logging.
        let Ok(record) = serde_json::from_value::<PostRecord>(record) else {
            return;
        };
        let post = CreatedPost { uri, cid, author: did, record };
        if let Err(err) = self.handle_post(post).await {
            tracing::error!(error = %err, "reply pipeline failed");
        }
    }

    async fn handle_post(&self, post: CreatedPost) -> Result<()> {
        if post.record.text.is_empty() {
            return Ok(());
        }
        if !mention::is_mentioned(&post.record, &self.identity.did) {
            return Ok(());
        }
        tracing::info!(repo = %post.author, text = %post.record.text, "new mention");

        let context =
            context::resolve_context(self.api.as_ref(), post.record.reply.as_ref()).await;
        let cleaned = compose::clean_user_text(&post.record.text, &self.identity.handle);
        let reply_text =
            compose::compose_reply(self.llm.as_ref(), context.as_deref(), &cleaned).await;
        let refs = threading::build_references(&post);

        self.api
            .publish_reply(&self.identity.did, &reply_text, &refs)
            .await?;
        tracing::info!(text = %reply_text, "posted reply");
        Ok(())
    }
}
