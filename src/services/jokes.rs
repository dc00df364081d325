//! Dad joke source

use std::fmt;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::state::PreferenceStore;

pub const DEFAULT_JOKE_URL: &str = "https://icanhazdadjoke.com/";

/// Notification text used when no joke could be fetched
pub const FALLBACK_MESSAGE: &str = "Time for a quick 20s eye break!";

const USER_AGENT: &str = concat!("look-away/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub enum JokeError {
    /// The request never got an answer
    Transport(String),
    /// The server answered with a non-success status
    Status(u16),
    /// The body was not the JSON we expected
    Malformed(String),
    /// Well-formed answer without a joke in it
    Missing,
}

impl JokeError {
    /// Whether the failure looks like a connectivity problem rather than an
    /// empty answer
    pub fn is_network(&self) -> bool {
        !matches!(self, JokeError::Missing)
    }
}

impl fmt::Display for JokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JokeError::Transport(e) => write!(f, "joke request failed: {}", e),
            JokeError::Status(code) => write!(f, "joke source answered with status {}", code),
            JokeError::Malformed(e) => write!(f, "joke response was malformed: {}", e),
            JokeError::Missing => write!(f, "joke response contained no joke"),
        }
    }
}

impl std::error::Error for JokeError {}

#[async_trait]
pub trait JokeSource: Send + Sync {
    async fn fetch(&self) -> Result<String, JokeError>;
}

#[derive(Debug, Deserialize)]
struct JokePayload {
    joke: Option<String>,
}

/// Fetches jokes over HTTP from an icanhazdadjoke-compatible endpoint
#[derive(Debug, Clone)]
pub struct HttpJokeSource {
    client: Client,
    url: String,
}

impl HttpJokeSource {
    pub fn new(url: impl Into<String>) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JokeSource for HttpJokeSource {
    async fn fetch(&self) -> Result<String, JokeError> {
        debug!("Fetching joke from {}", self.url);

        let response = self.client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| JokeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JokeError::Status(status.as_u16()));
        }

        let payload: JokePayload = response
            .json()
            .await
            .map_err(|e| JokeError::Malformed(e.to_string()))?;

        payload.joke
            .filter(|joke| !joke.trim().is_empty())
            .ok_or(JokeError::Missing)
    }
}

/// Fetch a joke and remember it as the last joke.
///
/// A failure to write the cache is logged and does not fail the fetch.
pub async fn fetch_and_cache(
    source: &dyn JokeSource,
    store: &PreferenceStore,
) -> Result<String, JokeError> {
    let joke = source.fetch().await?;

    if let Err(e) = store.set_last_joke(&joke).await {
        warn!("Failed to cache joke: {}", e);
    }

    Ok(joke)
}
