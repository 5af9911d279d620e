//! Translation of bridge responses into results and errors.

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Error URI the router reports when nobody registered the procedure.
pub const NO_SUCH_PROCEDURE: &str = "wamp.error.no_such_procedure";

/// Maps the HTTP status of a bridge response to an outcome, passing the
/// body text through on 200.
pub fn check_status(status: u16, text: String) -> Result<String> {
    match status {
        200 => Ok(text),
        400 => Err(Error::MissingParams(text)),
        401 => Err(Error::SignatureError(text)),
        _ => Err(Error::BadUrl(text)),
    }
}

/// Extracts the result of a call from a successful response body.
///
/// The first positional result (if any) is extracted before the `error`
/// field is inspected, and becomes the payload of the error when there is one.
pub fn interpret_call(body: &Value) -> Result<Option<Value>> {
    let value = body
        .get("args")
        .and_then(Value::as_array)
        .and_then(|args| args.first())
        .cloned();

    match body.get("error") {
        None | Some(Value::Null) => Ok(value),
        Some(Value::String(error)) if error.is_empty() => Ok(value),
        Some(Value::String(error)) if error.contains(NO_SUCH_PROCEDURE) => {
            Err(Error::NoCalleeRegistered(value))
        }
        Some(Value::String(_)) => Err(Error::CallRuntimeError(value)),
        Some(other) if other.to_string().contains(NO_SUCH_PROCEDURE) => {
            Err(Error::NoCalleeRegistered(value))
        }
        Some(_) => Err(Error::CallRuntimeError(value)),
    }
}

/// Extracts the publication id from a successful response body.
///
/// A missing `id` is the bridge breaking its contract; it yields `Null`.
pub fn interpret_publish(body: &Value) -> Value {
    match body.get("id") {
        Some(id) => id.clone(),
        None => {
            warn!("publish response carried no id: {}", body);
            Value::Null
        }
    }
}

/// A response as the transport delivered it, before interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub text: String,
}

impl RawResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Parses the body as JSON without looking at the status.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Applies the status mapping and parses the body.
    pub fn into_json(self) -> Result<Value> {
        let text = check_status(self.status, self.text)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Interprets the response as the answer to a call.
    pub fn into_call_result(self) -> Result<Option<Value>> {
        interpret_call(&self.into_json()?)
    }

    /// Interprets the response as the answer to a publish.
    pub fn into_publish_id(self) -> Result<Value> {
        Ok(interpret_publish(&self.into_json()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_table() {
        assert_eq!(check_status(200, "{}".into()).unwrap(), "{}");
        assert!(matches!(check_status(400, "missing".into()), Err(Error::MissingParams(t)) if t == "missing"));
        assert!(matches!(check_status(401, "bad sig".into()), Err(Error::SignatureError(t)) if t == "bad sig"));
        assert!(matches!(check_status(404, "nope".into()), Err(Error::BadUrl(t)) if t == "nope"));
        assert!(matches!(check_status(500, "boom".into()), Err(Error::BadUrl(_))));
        assert!(matches!(check_status(204, String::new()), Err(Error::BadUrl(_))));
    }

    #[test]
    fn call_takes_first_arg() {
        assert_eq!(interpret_call(&json!({"args": [15, 16]})).unwrap(), Some(json!(15)));
        assert_eq!(interpret_call(&json!({"args": []})).unwrap(), None);
        assert_eq!(interpret_call(&json!({})).unwrap(), None);
    }

    #[test]
    fn call_no_such_procedure() {
        let body = json!({"error": "wamp.error.no_such_procedure", "args": []});
        assert!(matches!(interpret_call(&body), Err(Error::NoCalleeRegistered(None))));

        let body = json!({"error": "wamp.error.no_such_procedure", "args": ["no callee for test.x"]});
        match interpret_call(&body) {
            Err(Error::NoCalleeRegistered(Some(v))) => assert_eq!(v, json!("no callee for test.x")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn call_runtime_error_carries_value() {
        let body = json!({"error": "wamp.error.runtime_error", "args": ["division by zero"]});
        match interpret_call(&body) {
            Err(Error::CallRuntimeError(Some(v))) => assert_eq!(v, json!("division by zero")),
            other => panic!("unexpected {:?}", other),
        }
        let body = json!({"error": {"uri": "app.failed"}});
        assert!(matches!(interpret_call(&body), Err(Error::CallRuntimeError(None))));
    }

    #[test]
    fn empty_or_null_error_is_success() {
        assert_eq!(interpret_call(&json!({"error": "", "args": [1]})).unwrap(), Some(json!(1)));
        assert_eq!(interpret_call(&json!({"error": null, "args": [1]})).unwrap(), Some(json!(1)));
    }

    #[test]
    fn publish_id() {
        assert_eq!(interpret_publish(&json!({"id": 42})), json!(42));
        assert_eq!(interpret_publish(&json!({})), Value::Null);
    }

    #[test]
    fn raw_response_lazy_interpretation() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(!RawResponse::new(400, "{}").is_success());
        assert!(!RawResponse::new(201, "{}").is_success());
        assert_eq!(RawResponse::new(200, r#"{"args":[15]}"#).into_call_result().unwrap(), Some(json!(15)));
        assert_eq!(RawResponse::new(200, r#"{"id":42}"#).into_publish_id().unwrap(), json!(42));
        assert!(matches!(RawResponse::new(401, "denied").into_publish_id(), Err(Error::SignatureError(_))));
        assert!(matches!(RawResponse::new(200, "not json").into_json(), Err(Error::SerdeJson(_))));
        assert!(RawResponse::new(400, "{}").json().is_ok());
    }
}
