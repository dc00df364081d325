//! HTTP client for the coordinator API

use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    api::{Ack, Reply, Request, StatusResponse},
    state::Broadcast,
};

#[derive(Debug, Clone)]
pub struct PanelClient {
    http: Client,
    base_url: String,
}

impl PanelClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send one command and wait for its acknowledgement
    pub async fn send(&self, request: &Request) -> Result<Reply, String> {
        let response = self.http
            .post(format!("{}/message", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Failed to reach coordinator: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Coordinator answered {}", response.status()));
        }

        response
            .json::<Reply>()
            .await
            .map_err(|e| format!("Unexpected coordinator reply: {}", e))
    }

    /// Send a command whose only answer is an acknowledgement
    pub async fn command(&self, request: &Request) -> Result<Ack, String> {
        match self.send(request).await? {
            Reply::Ack(ack) => Ok(ack),
            Reply::Joke(_) => Err(format!("{} was answered with a joke", request.name())),
        }
    }

    /// Send a joke request
    pub async fn joke(&self, request: &Request) -> Result<Option<String>, String> {
        match self.send(request).await? {
            Reply::Joke(reply) => Ok(reply.joke),
            Reply::Ack(_) => Err(format!("{} was answered without a joke", request.name())),
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, String> {
        let response = self.http
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .map_err(|e| format!("Failed to reach coordinator: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Coordinator answered {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Unexpected status reply: {}", e))
    }

    /// Follow the broadcast stream, calling `on_message` for each broadcast
    /// until the coordinator closes the stream
    pub async fn watch<F>(&self, mut on_message: F) -> Result<(), String>
    where
        F: FnMut(Broadcast),
    {
        let response = self.http
            .get(format!("{}/events", self.base_url))
            .send()
            .await
            .map_err(|e| format!("Failed to subscribe to broadcasts: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Coordinator answered {}", response.status()));
        }

        let mut parser = EventStreamParser::default();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| format!("Broadcast stream failed: {}", e))?;
            for message in parser.push(&chunk) {
                on_message(message);
            }
        }

        debug!("Broadcast stream ended");
        Ok(())
    }
}

/// Incremental parser for the `text/event-stream` body
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl EventStreamParser {
    /// Feed a chunk of bytes, returning every broadcast it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Broadcast> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(message) = self.dispatch() {
                    messages.push(message);
                }
            } else if let Some(data) = line.strip_prefix("data:") {
                self.data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
            // comments (keep-alives) and other fields are ignored
        }
        messages
    }

    fn dispatch(&mut self) -> Option<Broadcast> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();

        match serde_json::from_str(&payload) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Ignoring unreadable broadcast {:?}: {}", payload, e);
                None
            }
        }
    }
}
