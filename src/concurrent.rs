//! Non-blocking dispatch on a bounded worker pool.
//!
//! `call` and `publish` number and sign the request on the caller's thread,
//! then hand the HTTP exchange to the pool and return a `PendingResponse`
//! straight away. The pending handle resolves to the raw response: the
//! status code is NOT translated into an `Error` here. Callers that want
//! the same treatment as the blocking client use
//! `RawResponse::into_call_result` / `into_publish_id` on the result.
//! Transport failures still resolve to `Error::BadHost`.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tokio::{
    runtime::{Handle, Runtime},
    sync::Semaphore,
    task::JoinHandle,
};

use crate::{
    client::Client,
    config::Config,
    error::{Error, Result},
    request::{Args, CallOptions, Kwargs, OperationRequest},
    response::RawResponse,
};

/// An exchange running on the worker pool.
pub struct PendingResponse {
    handle: JoinHandle<Result<RawResponse>>,
}

impl PendingResponse {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks the current thread until the exchange completes.
    pub fn wait(self) -> Result<RawResponse> {
        futures::executor::block_on(self)
    }
}

impl Future for PendingResponse {
    type Output = Result<RawResponse>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(Error::Worker(e.to_string())),
        })
    }
}

/// Bridge client that never blocks the caller.
///
/// Dropping the client shuts its pool down and cancels exchanges still in
/// flight; their pending handles resolve to `Error::Worker`.
pub struct ConcurrentClient {
    client: Arc<Client>,
    runtime: Option<Runtime>,
    handle: Handle,
    permits: Arc<Semaphore>,
}

impl ConcurrentClient {
    pub fn new<U: Into<String>>(url: U) -> Result<Self> {
        Self::with_config(Config::new(url).concurrent(true))
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::from_client(Client::with_config(config)?)
    }

    /// Wraps an already configured async client; the pool size comes from
    /// its `max_workers`.
    pub fn from_client(client: Client) -> Result<Self> {
        let workers = client.config().max_workers;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("crossbar-http-worker")
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to create worker pool: {}", e)))?;
        let handle = runtime.handle().clone();
        Ok(Self {
            client: Arc::new(client),
            runtime: Some(runtime),
            handle,
            permits: Arc::new(Semaphore::new(workers)),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn call(&self, procedure: &str, args: Args, kwargs: Kwargs) -> PendingResponse {
        self.call_with(procedure, args, kwargs, &CallOptions::default())
    }

    pub fn call_with(
        &self,
        procedure: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> PendingResponse {
        self.dispatch(OperationRequest::call(procedure, args, kwargs), options)
    }

    pub fn publish(&self, topic: &str, args: Args, kwargs: Kwargs) -> PendingResponse {
        self.publish_with(topic, args, kwargs, &CallOptions::default())
    }

    pub fn publish_with(
        &self,
        topic: &str,
        args: Args,
        kwargs: Kwargs,
        options: &CallOptions,
    ) -> PendingResponse {
        self.dispatch(OperationRequest::publish(topic, args, kwargs), options)
    }

    fn dispatch(&self, request: OperationRequest, options: &CallOptions) -> PendingResponse {
        let hook = options
            .response_hook
            .clone()
            .or_else(|| self.client.config().response_hook.clone());
        // numbered on the caller's thread
        let prepared = self.client.prepare(&request, options);
        let client = Arc::clone(&self.client);
        let permits = Arc::clone(&self.permits);

        let handle = self.handle.spawn(async move {
            let prepared = prepared?;
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::Worker(e.to_string()))?;
            let response = client.send(prepared).await?;
            if let Some(hook) = hook {
                hook(&response);
            }
            Ok(response)
        });
        PendingResponse { handle }
    }
}

impl Drop for ConcurrentClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
