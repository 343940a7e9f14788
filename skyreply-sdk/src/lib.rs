//! skyreply-sdk: Bluesky client layer for the skyreply bot.
//!
//! Provides the pieces the bot treats as external collaborators:
//! - `firehose`: Jetstream websocket subscription delivering typed events
//! - `agent`: authenticated XRPC client (session, profile, threads, records)
//! - `record` / `event`: the AT Protocol data model the bot consumes

pub mod agent;
pub mod event;
pub mod firehose;
pub mod record;
