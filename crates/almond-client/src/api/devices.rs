//! Devices API.

use serde_json::Value;

use crate::client::AlmondApi;
use crate::error::Result;
use crate::types::DeviceConfig;

/// Devices API client.
pub struct DevicesApi {
    client: AlmondApi,
}

impl DevicesApi {
    pub(crate) fn new(client: AlmondApi) -> Self {
        Self { client }
    }

    /// List configured devices.
    pub async fn list(&self) -> Result<Value> {
        self.client.get("/api/devices/list").await
    }

    /// Create a device from a configuration object.
    ///
    /// Accepts a [`DeviceConfig`] or any JSON value. The value must be an
    /// object with a `kind` entry; otherwise this fails with
    /// [`Error::InvalidDevice`](crate::Error::InvalidDevice) and nothing is
    /// sent.
    pub async fn create(&self, config: impl Into<Value>) -> Result<Value> {
        let config = DeviceConfig::try_from(config.into())?;
        self.client.post("/api/devices/create", &config).await
    }

    /// Create a device that needs nothing but its kind.
    pub async fn create_simple(&self, kind: impl Into<String>) -> Result<Value> {
        self.create(DeviceConfig::new(kind)).await
    }
}
