//! Parent-post context for mentions that arrive as replies.

use skyreply_sdk::record::ReplyRef;

use crate::dispatch::AgentApi;

/// Fetch the text of the post the mention replies to, formatted for the
/// prompt. No reply descriptor means no network call and no context.
/// Every failure mode degrades to `None`; the reply pipeline proceeds
/// without context rather than aborting.
pub async fn resolve_context(api: &dyn AgentApi, reply: Option<&ReplyRef>) -> Option<String> {
    let reply = reply?;
    let thread = match api.fetch_thread(&reply.parent.uri).await {
        Ok(thread) => thread,
        Err(err) => {
            tracing::warn!(uri = %reply.parent.uri, error = %err, "could not fetch parent post");
            return None;
        }
    };
    let record = thread.post?.record?;
    if record.text.is_empty() {
        return None;
    }
    Some(format!("Post being discussed:\n{}", record.text))
}
