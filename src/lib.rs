//! # Crossbar HTTP Bridge Client
//!
//! This crate calls remote procedures and publishes events through a
//! Crossbar HTTP bridge, without holding a WAMP session open. It supports:
//!
//! - Calls (`call`) returning the first positional result
//! - Publications (`publish`) returning the publication id
//! - HMAC-SHA256 request signing when a key and secret are configured
//! - Blocking, async and worker-pool dispatch
//! - Typed errors for every failure the bridge reports
//!
//! For usage examples, see `demos/bridge.rs`.

pub mod blocking;
pub mod client;
pub mod concurrent;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod response;
pub mod signing;

pub use blocking::BlockingClient;
pub use client::{Client, ClientBuilder, PreparedRequest};
pub use concurrent::{ConcurrentClient, PendingResponse};
pub use config::{Config, Credentials, ResponseHook, TransportOptions};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use request::{Args, CallOptions, Kwargs, OperationRequest};
pub use response::RawResponse;
