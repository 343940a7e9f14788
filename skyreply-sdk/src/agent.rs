//! Authenticated XRPC client for a Bluesky PDS.
//!
//! Covers the four calls the bot needs: `com.atproto.server.createSession`
//! (login), `app.bsky.actor.getProfile` (identity resolution),
//! `app.bsky.feed.getPostThread` (parent context) and
//! `com.atproto.repo.createRecord` (posting replies). Session state is
//! written once by `login` and read-only afterwards.

use chrono::Utc;
use serde::Deserialize;

use crate::record::{PostRecord, ReplyRef, StrongRef, POST_COLLECTION};

/// Errors surfaced by the XRPC agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("xrpc error {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// The bot's resolved identity, constant for the process lifetime.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub did: String,
    pub handle: String,
}

/// An actor profile, as much of it as the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub did: String,
    pub handle: String,
}

/// One node of a `getPostThread` response. Blocked and not-found thread
/// views carry no `post` field and decode with `post: None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadView {
    #[serde(default)]
    pub post: Option<PostView>,
}

/// A hydrated post inside a thread view.
#[derive(Debug, Clone, Deserialize)]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    #[serde(default)]
    pub record: Option<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "accessJwt")]
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    thread: ThreadView,
}

struct Session {
    access_jwt: String,
    did: String,
}

/// XRPC agent bound to one PDS.
pub struct Agent {
    http: reqwest::Client,
    service: String,
    session: Option<Session>,
}

impl Agent {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            service: service.into(),
            session: None,
        }
    }

    /// Authenticate with an identifier (handle or DID) and app password.
    pub async fn login(
        &mut self,
        identifier: &str,
        password: &str,
    ) -> Result<BotIdentity, AgentError> {
        let resp = self
            .http
            .post(format!("{}/xrpc/com.atproto.server.createSession", self.service))
            .json(&serde_json::json!({
                "identifier": identifier,
                "password": password,
            }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let session: SessionResponse = resp.json().await?;
        let identity = BotIdentity {
            did: session.did.clone(),
            handle: session.handle,
        };
        self.session = Some(Session {
            access_jwt: session.access_jwt,
            did: session.did,
        });
        Ok(identity)
    }

    /// The repository DID of the logged-in account.
    pub fn did(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.did.as_str())
    }

    /// Fetch an actor's profile.
    pub async fn get_profile(&self, actor: &str) -> Result<Profile, AgentError> {
        let resp = self
            .authed(self.http.get(format!(
                "{}/xrpc/app.bsky.actor.getProfile",
                self.service
            )))?
            .query(&[("actor", actor)])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// Fetch the thread view rooted at a post URI.
    pub async fn get_post_thread(&self, uri: &str) -> Result<ThreadView, AgentError> {
        let resp = self
            .authed(self.http.get(format!(
                "{}/xrpc/app.bsky.feed.getPostThread",
                self.service
            )))?
            .query(&[("uri", uri), ("depth", "0")])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: ThreadResponse = resp.json().await?;
        Ok(body.thread)
    }

    /// Create a post record in `repo`, threaded per `reply` when present.
    pub async fn create_post(
        &self,
        repo: &str,
        text: &str,
        reply: Option<&ReplyRef>,
    ) -> Result<StrongRef, AgentError> {
        let record = match reply {
            Some(reply) => serde_json::json!({
                "$type": POST_COLLECTION,
                "text": text,
                "createdAt": Utc::now().to_rfc3339(),
                "reply": reply,
            }),
            None => serde_json::json!({
                "$type": POST_COLLECTION,
                "text": text,
                "createdAt": Utc::now().to_rfc3339(),
            }),
        };
        let resp = self
            .authed(self.http.post(format!(
                "{}/xrpc/com.atproto.repo.createRecord",
                self.service
            )))?
            .json(&serde_json::json!({
                "repo": repo,
                "collection": POST_COLLECTION,
                "record": record,
            }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, AgentError> {
        let session = self.session.as_ref().ok_or(AgentError::NotLoggedIn)?;
        Ok(builder.bearer_auth(&session.access_jwt))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AgentError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let message = resp.text().await.unwrap_or_default();
        Err(AgentError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_thread_view_decodes_without_post() {
        let json = r#"{"$type": "app.bsky.feed.defs#blockedPost", "blocked": true}"#;
        let view: ThreadView = serde_json::from_str(json).unwrap();
        assert!(view.post.is_none());
    }

    #[test]
    fn thread_view_decodes_post_record_text() {
        let json = r#"{
            "$type": "app.bsky.feed.defs#threadViewPost",
            "post": {
                "uri": "at://did:plc:a/app.bsky.feed.post/1",
                "cid": "cidA",
                "record": {"text": "the parent post"}
            }
        }"#;
        let view: ThreadView = serde_json::from_str(json).unwrap();
        let post = view.post.unwrap();
        assert_eq!(post.record.unwrap().text, "the parent post");
    }

    #[test]
    fn unauthenticated_agent_refuses_writes() {
        let agent = Agent::new("https://bsky.social");
        assert!(agent.did().is_none());
        let err = agent
            .authed(agent.http.get("https://bsky.social/xrpc/x"))
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::NotLoggedIn));
    }
}
