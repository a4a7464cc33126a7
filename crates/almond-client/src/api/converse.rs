//! Conversation API.

use serde_json::Value;

use crate::client::AlmondApi;
use crate::error::Result;
use crate::types::ConverseRequest;

/// Conversation API client.
pub struct ConverseApi {
    client: AlmondApi,
}

impl ConverseApi {
    pub(crate) fn new(client: AlmondApi) -> Self {
        Self { client }
    }

    /// Send a converse request and return the assistant's reply.
    pub async fn send(&self, request: &ConverseRequest) -> Result<Value> {
        self.client.post("/api/converse", request).await
    }

    /// Send a natural language message.
    pub async fn text(
        &self,
        text: impl Into<String>,
        conversation_id: Option<&str>,
    ) -> Result<Value> {
        self.send(&with_conversation(ConverseRequest::text(text), conversation_id))
            .await
    }

    /// Send a ThingTalk program to be executed.
    pub async fn program(
        &self,
        code: impl Into<String>,
        conversation_id: Option<&str>,
    ) -> Result<Value> {
        self.send(&with_conversation(ConverseRequest::program(code), conversation_id))
            .await
    }
}

fn with_conversation(request: ConverseRequest, conversation_id: Option<&str>) -> ConverseRequest {
    match conversation_id {
        Some(id) => request.with_conversation(id),
        None => request,
    }
}
