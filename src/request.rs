//! Request bodies and target URLs for bridge operations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ResponseHook;

/// Positional arguments of a call or publish.
pub type Args = Vec<Value>;
/// Keyword arguments of a call or publish.
pub type Kwargs = Map<String, Value>;

/// The two operations the bridge exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Call,
    Publish,
}

impl Operation {
    /// Path suffix used when the caller does not override it.
    pub fn default_path(self) -> &'static str {
        match self {
            Operation::Call => "call",
            Operation::Publish => "publish",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Procedure(String),
    Topic(String),
}

/// JSON body of a call or publish.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationRequest {
    #[serde(flatten)]
    pub target: Target,
    pub args: Args,
    pub kwargs: Kwargs,
}

impl OperationRequest {
    pub fn call<P: Into<String>>(procedure: P, args: Args, kwargs: Kwargs) -> Self {
        Self {
            target: Target::Procedure(procedure.into()),
            args,
            kwargs,
        }
    }

    pub fn publish<T: Into<String>>(topic: T, args: Args, kwargs: Kwargs) -> Self {
        Self {
            target: Target::Topic(topic.into()),
            args,
            kwargs,
        }
    }

    pub fn operation(&self) -> Operation {
        match self.target {
            Target::Procedure(_) => Operation::Call,
            Target::Topic(_) => Operation::Publish,
        }
    }
}

/// Per-call control options, kept apart from the user's keyword arguments.
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Replaces the operation's default path suffix.
    pub transport_path: Option<String>,
    /// Replaces the concurrent client's default response hook.
    /// Ignored by the blocking and async clients.
    pub response_hook: Option<ResponseHook>,
}

impl CallOptions {
    pub fn transport_path<P: Into<String>>(mut self, path: P) -> Self {
        self.transport_path = Some(path.into());
        self
    }

    pub fn response_hook(
        mut self,
        hook: impl Fn(&crate::response::RawResponse) + Send + Sync + 'static,
    ) -> Self {
        self.response_hook = Some(std::sync::Arc::new(hook));
        self
    }

    pub(crate) fn path_for(&self, operation: Operation) -> &str {
        self.transport_path
            .as_deref()
            .unwrap_or_else(|| operation.default_path())
    }
}

/// Resolves the target URL for an operation.
///
/// When `suffix` already occurs anywhere in `base` the base URL is used as
/// is; otherwise the two are concatenated without a separator. A base such
/// as "http://host/call" therefore works for calls, and "http://host/" for
/// both operations. The substring match also fires when the suffix appears
/// by coincidence elsewhere in the base URL.
pub fn resolve_url(base: &str, suffix: &str) -> String {
    if base.contains(suffix) {
        base.to_string()
    } else {
        format!("{}{}", base, suffix)
    }
}
