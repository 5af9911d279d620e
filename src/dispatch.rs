//! Dispatch mode selection.

use crate::{
    blocking::BlockingClient,
    concurrent::ConcurrentClient,
    config::Config,
    error::Result,
};

/// A client in the dispatch mode chosen by `Config::concurrent`.
pub enum Dispatcher {
    Blocking(BlockingClient),
    Concurrent(ConcurrentClient),
}

impl Dispatcher {
    /// Builds the client for the configured mode. The mode is fixed for the
    /// lifetime of the returned value.
    ///
    /// The blocking mode owns its own tokio runtime: calling it from inside
    /// another runtime panics, and so does dropping it there. Async callers
    /// should use `Client` directly or set `concurrent`.
    pub fn from_config(config: Config) -> Result<Self> {
        if config.concurrent {
            Ok(Dispatcher::Concurrent(ConcurrentClient::with_config(config)?))
        } else {
            Ok(Dispatcher::Blocking(BlockingClient::with_config(config)?))
        }
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(self, Dispatcher::Concurrent(_))
    }
}
