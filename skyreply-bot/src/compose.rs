//! Reply generation: prompt assembly, length policy, fallback.

use crate::llm::{ChatBackend, ChatMessage};

/// System instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant on Bluesky. Respond concisely (<=300 chars).\n\
If referring to a post, mention that you're responding to it.";

/// Hard ceiling on posted reply length.
pub const MAX_REPLY_CHARS: usize = 280;

/// What gets posted when the backend fails or returns nothing.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error generating a response.";

const MAX_COMPLETION_TOKENS: u32 = 200;

/// Strip the bot's own @handle from the mention text.
pub fn clean_user_text(text: &str, bot_handle: &str) -> String {
    text.replace(&format!("@{bot_handle}"), "").trim().to_string()
}

/// Ask the backend for a reply. Always returns a postable string:
/// trimmed, capped at [`MAX_REPLY_CHARS`], or [`FALLBACK_REPLY`] on any
/// backend failure or empty completion.
pub async fn compose_reply(
    llm: &dyn ChatBackend,
    context: Option<&str>,
    user_text: &str,
) -> String {
    let user_message = match context {
        Some(context) => format!("{context}\n\nUser's request: {user_text}"),
        None => format!("User's request: {user_text}"),
    };
    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_message),
    ];

    match llm.chat(&messages, MAX_COMPLETION_TOKENS).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                tracing::error!("completion backend returned no content");
                FALLBACK_REPLY.to_string()
            } else {
                truncate_chars(trimmed, MAX_REPLY_CHARS)
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "completion backend error");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Truncate on a character boundary, never mid-codepoint.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
