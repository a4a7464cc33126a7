//! HTTP client for the Almond home-automation assistant.
//!
//! Every call is a single authenticated request whose JSON reply is returned
//! as a [`serde_json::Value`].
//!
//! # Example
//!
//! ```no_run
//! use almond_client::{AlmondApi, DeviceConfig, Result};
//!
//! # async fn example() -> Result<()> {
//! // Trusted local caller
//! let client = AlmondApi::local("http://127.0.0.1:3000")?;
//!
//! // Talk to the assistant
//! let reply = client.converse_text("what's the weather?", None).await?;
//! println!("{}", reply);
//!
//! // Add a device
//! let config = DeviceConfig::new("com.example.foo").with_field("host", "10.0.0.5");
//! client.create_device(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Authentication
//!
//! - [`LocalAuth`]: sends `origin: http://127.0.0.1:3000`, which the server
//!   trusts without a token.
//! - [`BearerAuth`]: sends `Authorization: Bearer <token>`, asking a
//!   [`TokenProvider`] for the token before every request.
//!
//! # API Coverage
//!
//! - **Apps**: list apps
//! - **Devices**: list devices, create devices
//! - **Converse**: natural language commands and ThingTalk programs

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use api::{AppsApi, ConverseApi, DevicesApi};
pub use auth::{
    AlmondAuth, BearerAuth, LOCAL_ORIGIN, LocalAuth, RequestOptions, StaticToken, TokenProvider,
};
pub use client::{AlmondApi, ClientBuilder};
pub use error::{BoxError, Error, Result};
pub use types::*;
