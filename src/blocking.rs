//! Synchronous dispatch: every operation blocks until the exchange is done.

use serde_json::Value;

use crate::{
    client::Client,
    config::Config,
    error::{Error, Result},
    request::{Args, CallOptions, Kwargs},
};

/// Blocking wrapper around the async `Client`.
///
/// Owns a single-threaded tokio runtime, so it must not be used from
/// inside another runtime.
pub struct BlockingClient {
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl BlockingClient {
    pub fn new<U: Into<String>>(url: U) -> Result<Self> {
        Self::with_config(Config::new(url))
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::from_client(Client::with_config(config)?)
    }

    /// Wraps an already configured async client.
    pub fn from_client(client: Client) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to create tokio runtime: {}", e)))?;
        Ok(Self { client, runtime })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn call(&self, procedure: &str, args: Args, kwargs: Kwargs) -> Result<Option<Value>> {
        self.runtime.block_on(self.client.call(procedure, args, kwargs))
    }

    pub fn call_with(
        &self,
        procedure: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> Result<Option<Value>> {
        self.runtime
            .block_on(self.client.call_with(procedure, args, kwargs, options))
    }

    pub fn publish(&self, topic: &str, args: Args, kwargs: Kwargs) -> Result<Value> {
        self.runtime.block_on(self.client.publish(topic, args, kwargs))
    }

    pub fn publish_with(
        &self,
        topic: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> Result<Value> {
        self.runtime
            .block_on(self.client.publish_with(topic, args, kwargs, options))
    }
}
