//! Configuration options for the bridge client.

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    error::{Error, Result},
    response::RawResponse,
};

/// Callback invoked by the concurrent client when a response arrives.
pub type ResponseHook = Arc<dyn Fn(&RawResponse) + Send + Sync>;

/// Default size of the concurrent worker pool.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Signing credentials. Key and secret only ever exist together.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: Vec<u8>,
}

impl Credentials {
    pub fn new<K: Into<String>, S: AsRef<[u8]>>(key: K, secret: S) -> Self {
        Self {
            key: key.into(),
            secret: secret.as_ref().to_vec(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Options handed to the HTTP transport untouched.
///
/// `timeout`, `headers` and `basic_auth` go on every request, so they also
/// apply to an injected `reqwest::Client`. The others are only used when the
/// crate builds its own client.
#[derive(Clone, Debug, Default)]
pub struct TransportOptions {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub proxy: Option<String>,
    /// Ignores system proxy settings (`HTTP_PROXY` and friends).
    pub no_proxy: bool,
    pub accept_invalid_certs: bool,
    pub cookie_store: bool,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, Option<String>)>,
}

impl TransportOptions {
    /// Builds a reqwest client honouring the client-level options.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(self.cookie_store)
            .danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| Error::Config(format!("invalid proxy {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
    }

    /// Applies the per-request options.
    pub(crate) fn apply(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, password.as_ref());
        }
        request
    }
}

/// Configuration for the bridge client.
#[derive(Clone)]
pub struct Config {
    /// Bridge endpoint, e.g. "http://router:8080/call" or "http://router:8080/".
    pub url: String,
    /// Enables request signing when present.
    pub credentials: Option<Credentials>,
    /// Raises request and response traces from `debug` to `info`. They are
    /// emitted through `tracing`, so the application needs a subscriber
    /// installed to see them.
    pub verbose: bool,
    /// Selects the concurrent dispatch mode in `Dispatcher::from_config`.
    pub concurrent: bool,
    /// Worker threads and in-flight limit of the concurrent client.
    pub max_workers: usize,
    /// Default hook for the concurrent client.
    pub response_hook: Option<ResponseHook>,
    pub transport: TransportOptions,
}

impl Config {
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            verbose: false,
            concurrent: false,
            max_workers: DEFAULT_MAX_WORKERS,
            response_hook: None,
            transport: TransportOptions::default(),
        }
    }

    pub fn with_credentials<K: Into<String>, S: AsRef<[u8]>>(mut self, key: K, secret: S) -> Self {
        self.credentials = Some(Credentials::new(key, secret));
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn response_hook(mut self, hook: impl Fn(&RawResponse) + Send + Sync + 'static) -> Self {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    pub fn transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    /// Checks the invariants the client relies on.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("url must not be empty".into()));
        }
        if self.max_workers == 0 {
            return Err(Error::Config("max_workers must be at least 1".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("verbose", &self.verbose)
            .field("concurrent", &self.concurrent)
            .field("max_workers", &self.max_workers)
            .field("response_hook", &self.response_hook.is_some())
            .field("transport", &self.transport)
            .finish()
    }
}
