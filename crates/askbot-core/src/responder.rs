use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AskError;

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

/// Reply body of the `/ask` endpoint. `response` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AskReply {
    #[serde(default)]
    pub response: Option<String>,
}

impl AskReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    /// The reply text, if the responder actually sent some.
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().filter(|text| !text.is_empty())
    }
}

/// Anything that can answer a chat query.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn ask(&self, query: &str) -> Result<AskReply, AskError>;
}

/// Responder backed by `POST <endpoint>/ask`.
#[derive(Clone)]
pub struct HttpResponder {
    client: Client,
    base_url: String,
}

impl HttpResponder {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn ask(&self, query: &str) -> Result<AskReply, AskError> {
        let url = self.ask_url();
        debug!(%url, "sending query");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&AskRequest { query })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AskError::Connect(format!("{url}: {e}"))
                } else {
                    AskError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AskError::Status(response.status()));
        }

        let reply: AskReply = response
            .json()
            .await
            .map_err(|e| AskError::Decode(e.to_string()))?;
        debug!(has_text = reply.text().is_some(), "received reply");
        Ok(reply)
    }
}
