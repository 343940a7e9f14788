//! skyreply-bot: replies to Bluesky posts that mention it.
//!
//! The pipeline, in order: the dispatcher filters firehose events down to
//! post creations, the mention detector gates on the bot's DID, the
//! context resolver fetches the parent post when the mention is a reply,
//! the composer asks the LLM for a short answer, and the reference
//! builder threads the reply correctly before it is posted.

pub mod compose;
pub mod context;
pub mod dispatch;
pub mod llm;
pub mod mention;
pub mod threading;
