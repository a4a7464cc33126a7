//! Apps API.

use serde_json::Value;

use crate::client::AlmondApi;
use crate::error::Result;

/// Apps API client.
pub struct AppsApi {
    client: AlmondApi,
}

impl AppsApi {
    pub(crate) fn new(client: AlmondApi) -> Self {
        Self { client }
    }

    /// List the apps running on the assistant.
    pub async fn list(&self) -> Result<Value> {
        self.client.get("/api/apps/list").await
    }
}
