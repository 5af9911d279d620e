//! # Bridge Client
//!
//! The async client for a Crossbar HTTP bridge. Each `call` or `publish` is
//! one independent POST:
//! - the JSON body is built from the procedure/topic and its arguments
//! - the per-client sequence number is bumped
//! - when credentials are configured, the body is signed and the
//!   `timestamp`, `seq`, `nonce`, `signature` and `key` query parameters
//!   are attached
//! - the status code and body are translated into a value or an `Error`
//!
//! There is no connection state, no retry and no batching.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    request::{resolve_url, Args, CallOptions, Kwargs, Operation, OperationRequest},
    response::{interpret_call, interpret_publish, RawResponse},
    signing::{NonceSource, RandomNonce, SignedRequest, Signer},
};

/// A request that has been numbered (and signed) and is ready to send.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub operation: Operation,
    pub url: String,
    pub body: Vec<u8>,
    pub sequence: u64,
    pub signed: Option<SignedRequest>,
}

/// Builder for a `Client` with injected collaborators.
pub struct ClientBuilder {
    config: Config,
    http: Option<reqwest::Client>,
    nonces: Arc<dyn NonceSource>,
}

impl ClientBuilder {
    /// Uses an existing reqwest client (connection reuse, custom TLS, ...).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Replaces the random nonce source.
    pub fn nonce_source(mut self, nonces: impl NonceSource + 'static) -> Self {
        self.nonces = Arc::new(nonces);
        self
    }

    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        let http = match self.http {
            Some(http) => http,
            None => self.config.transport.build_client()?,
        };
        let signer = self
            .config
            .credentials
            .clone()
            .map(|credentials| Signer::new(credentials, self.nonces.clone()));
        Ok(Client {
            config: self.config,
            http,
            signer,
            sequence: AtomicU64::new(1),
        })
    }
}

/// The async bridge client.
pub struct Client {
    config: Config,
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Present only when credentials are configured
    signer: Option<Signer>,
    /// Next sequence number; starts at 1 and is bumped once per attempt
    sequence: AtomicU64,
}

impl Client {
    /// Creates a client for `url` with default configuration.
    pub fn new<U: Into<String>>(url: U) -> Result<Self> {
        Self::with_config(Config::new(url))
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder {
            config,
            http: None,
            nonces: Arc::new(RandomNonce),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The sequence number the next request will carry.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn trace(&self, message: fmt::Arguments<'_>) {
        if self.config.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    /// Calls `procedure` and returns its first positional result.
    pub async fn call(&self, procedure: &str, args: Args, kwargs: Kwargs) -> Result<Option<Value>> {
        self.call_with(procedure, args, kwargs, &CallOptions::default()).await
    }

    pub async fn call_with(
        &self,
        procedure: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> Result<Option<Value>> {
        let request = OperationRequest::call(procedure, args, kwargs);
        let prepared = self.prepare(&request, options)?;
        let body = self.send(prepared).await?.into_json()?;
        interpret_call(&body)
    }

    /// Publishes an event to `topic` and returns the publication id.
    pub async fn publish(&self, topic: &str, args: Args, kwargs: Kwargs) -> Result<Value> {
        self.publish_with(topic, args, kwargs, &CallOptions::default()).await
    }

    pub async fn publish_with(
        &self,
        topic: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> Result<Value> {
        let request = OperationRequest::publish(topic, args, kwargs);
        let prepared = self.prepare(&request, options)?;
        let body = self.send(prepared).await?.into_json()?;
        Ok(interpret_publish(&body))
    }

    /// Serialises the body, takes the next sequence number and signs.
    ///
    /// The counter is bumped even if the request is never sent or fails.
    pub fn prepare(&self, request: &OperationRequest, options: &CallOptions) -> Result<PreparedRequest> {
        let operation = request.operation();
        let url = resolve_url(&self.config.url, options.path_for(operation));
        let body = serde_json::to_vec(request)?;
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);

        self.trace(format_args!("Request: POST {}", url));
        self.trace(format_args!("Params: {}", String::from_utf8_lossy(&body)));

        let signed = self
            .signer
            .as_ref()
            .map(|signer| signer.sign_body(sequence, &body));
        Ok(PreparedRequest {
            operation,
            url,
            body,
            sequence,
            signed,
        })
    }

    /// Performs the HTTP exchange. Transport failures become `BadHost`;
    /// the status code is not interpreted here.
    pub async fn send(&self, prepared: PreparedRequest) -> Result<RawResponse> {
        let mut request = self
            .http
            .post(&prepared.url)
            .header(CONTENT_TYPE, "application/json")
            .body(prepared.body);
        if let Some(signed) = &prepared.signed {
            request = request.query(&signed.query_pairs());
        }
        let request = self.config.transport.apply(request).build()?;
        if prepared.signed.is_some() {
            self.trace(format_args!(
                "Signature Params: {}",
                request.url().query().unwrap_or_default()
            ));
        }

        let resp = self.http.execute(request).await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        self.trace(format_args!("Response: {} {}", status, text));
        Ok(RawResponse { status, text })
    }
}
