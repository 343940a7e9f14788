//! skyreply-bot: a Bluesky bot that answers posts mentioning it.
//!
//! Runs as a single process: logs in to a PDS, resolves its own identity,
//! subscribes to the Jetstream firehose filtered to post creations, and
//! spawns one task per delivered event. Mentions get an LLM-generated
//! reply threaded under the mentioning post.
//!
//! Requires BLUESKY_HANDLE, BLUESKY_APP_PASSWORD and OPENAI_API_KEY
//! (flags or environment; a .env file is honored).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use skyreply_sdk::agent::{Agent, BotIdentity};
use skyreply_sdk::firehose::{self, FirehoseConfig};
use skyreply_sdk::record::POST_COLLECTION;

use skyreply_bot::dispatch::Dispatcher;
use skyreply_bot::llm::LlmClient;

#[derive(Parser)]
#[command(name = "skyreply-bot", about = "Bluesky mention-reply bot")]
struct Args {
    /// PDS service URL
    #[arg(long, default_value = "https://bsky.social")]
    service: String,

    /// Jetstream websocket endpoint
    #[arg(long, default_value = "wss://jetstream2.us-east.bsky.network/subscribe")]
    relay: String,

    /// Bot account handle
    #[arg(long, env = "BLUESKY_HANDLE", default_value = "")]
    handle: String,

    /// App password for the bot account
    #[arg(long, env = "BLUESKY_APP_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Completion model
    #[arg(long, default_value = "gpt-3.5-turbo")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyreply_bot=info,skyreply_sdk=info".into()),
        )
        .init();

    let args = Args::parse();

    // Startup failures here are fatal; everything after the subscription
    // starts is recovered per event.
    let mut agent = Agent::new(&args.service);
    agent
        .login(&args.handle, &args.password)
        .await
        .context("login failed")?;
    let profile = agent
        .get_profile(&args.handle)
        .await
        .context("failed to resolve bot profile")?;
    let identity = BotIdentity { did: profile.did, handle: profile.handle };
    tracing::info!(handle = %identity.handle, did = %identity.did, "logged in");

    let llm = LlmClient::new(args.api_key.clone()).with_model(&args.model);
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(agent), Arc::new(llm), identity));

    let mut events = firehose::subscribe(FirehoseConfig {
        service: args.relay.clone(),
        collections: vec![POST_COLLECTION.to_string()],
    });
    tracing::info!(relay = %args.relay, "firehose subscription started; listening for mentions");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    tracing::warn!("event channel closed, exiting");
                    break;
                };
                // One task per event: a slow mention pipeline must not
                // delay delivery of the next event.
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.on_event(event).await;
                });
            }
        }
    }

    Ok(())
}
