//! Custom predicate checks attached to a value.
//!
//! A check receives both the field name and the field value. Checks run in
//! declaration order, one at a time, after the built-in constraints of the
//! value passed.
//!
//! ```rust,ignore
//! use routeforge_schema::prelude::*;
//!
//! let username = StringValue::new("username")
//!     .required()
//!     .check_fn(|v| v.as_str() != Some("admin"), "The username is reserved");
//! ```

use async_trait::async_trait;
use serde_json::Value as Json;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Error raised by a check that could not decide.
pub type CheckError = Box<dyn std::error::Error + Send + Sync>;

/// An async predicate over a single field.
///
/// Return `Ok(true)` to accept, `Ok(false)` to reject with the rule's message,
/// and `Err` when the predicate itself failed (a timeout, a lost connection).
#[async_trait]
pub trait Check: Send + Sync {
    /// Decide whether `value` is acceptable for `field`.
    async fn check(&self, field: &str, value: &Json) -> Result<bool, CheckError>;
}

/// Check backed by a synchronous closure.
pub struct FnCheck<F>(pub F);

#[async_trait]
impl<F> Check for FnCheck<F>
where
    F: Fn(&Json) -> bool + Send + Sync + 'static,
{
    async fn check(&self, _field: &str, value: &Json) -> Result<bool, CheckError> {
        Ok((self.0)(value))
    }
}

/// Check backed by a closure returning a future.
pub struct AsyncFnCheck<F>(pub F);

#[async_trait]
impl<F, Fut> Check for AsyncFnCheck<F>
where
    F: Fn(Json) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
{
    async fn check(&self, _field: &str, value: &Json) -> Result<bool, CheckError> {
        (self.0)(value.clone()).await
    }
}

/// A check paired with the message reported when it rejects a value.
#[derive(Clone)]
pub struct CheckRule {
    check: Arc<dyn Check>,
    message: String,
}

impl CheckRule {
    /// Pair a check with its failure message.
    pub fn new(check: impl Check + 'static, message: impl Into<String>) -> Self {
        Self {
            check: Arc::new(check),
            message: message.into(),
        }
    }

    /// Rule from a synchronous predicate.
    pub fn from_fn<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Json) -> bool + Send + Sync + 'static,
    {
        Self::new(FnCheck(predicate), message)
    }

    /// Rule from an async predicate.
    pub fn from_async_fn<F, Fut>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(Json) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
    {
        Self::new(AsyncFnCheck(predicate), message)
    }

    /// The message as declared.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message reported on rejection, always ending with a period.
    pub fn failure_message(&self) -> String {
        if self.message.ends_with('.') {
            self.message.clone()
        } else {
            format!("{}.", self.message)
        }
    }

    pub(crate) async fn run(&self, field: &str, value: &Json) -> Result<bool, CheckError> {
        self.check.check(field, value).await
    }
}

impl fmt::Debug for CheckRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NotReserved;

    #[async_trait]
    impl Check for NotReserved {
        async fn check(&self, field: &str, value: &Json) -> Result<bool, CheckError> {
            Ok(field == "username" && value != &json!("root"))
        }
    }

    #[tokio::test]
    async fn trait_check_sees_field_and_value() {
        let rule = CheckRule::new(NotReserved, "Reserved name");
        assert!(rule.run("username", &json!("alice")).await.unwrap());
        assert!(!rule.run("username", &json!("root")).await.unwrap());
        assert!(!rule.run("nickname", &json!("alice")).await.unwrap());
    }

    #[tokio::test]
    async fn fn_checks_run() {
        let sync = CheckRule::from_fn(|v| v.as_i64() == Some(7), "Must be seven");
        assert!(sync.run("n", &json!(7)).await.unwrap());
        assert!(!sync.run("n", &json!(8)).await.unwrap());

        let failing = CheckRule::from_async_fn(
            |_v| async { Err::<bool, CheckError>("backend down".into()) },
            "Unreachable",
        );
        let err = failing.run("n", &json!(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    #[test]
    fn failure_message_gets_single_period() {
        assert_eq!(
            CheckRule::from_fn(|_| true, "Taken").failure_message(),
            "Taken."
        );
        assert_eq!(
            CheckRule::from_fn(|_| true, "Taken.").failure_message(),
            "Taken."
        );
    }
}
