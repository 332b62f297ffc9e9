//! Named diagnostic operations exposed by a configuration.
//!
//! Probes are registered while a configuration is described and invoked on
//! demand afterwards. The engine never calls them itself and never catches
//! their failures.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Error returned by a failing probe.
///
/// The original error is recoverable with `downcast_ref`.
pub type ProbeError = Box<dyn StdError + Send + Sync + 'static>;

type ProbeFn = dyn Fn() -> Result<serde_json::Value, ProbeError> + Send + Sync;

/// A named, zero-argument diagnostic callable.
///
/// # Example
///
/// ```
/// use propbind::Probe;
///
/// let probe = Probe::new("answer", || Ok(42));
/// assert_eq!(probe.to_string(), "answer");
/// assert_eq!(probe.invoke().unwrap(), serde_json::json!(42));
/// ```
#[derive(Clone)]
pub struct Probe {
    name: String,
    call: Arc<ProbeFn>,
}

impl Probe {
    /// Create a probe from a closure returning any serializable value.
    ///
    /// A closure returning `()` yields `null` when invoked.
    pub fn new<R, F>(name: impl Into<String>, f: F) -> Self
    where
        R: Serialize,
        F: Fn() -> Result<R, ProbeError> + Send + Sync + 'static,
    {
        let call = move || {
            let result = f()?;
            serde_json::to_value(result).map_err(|e| Box::new(e) as ProbeError)
        };
        Self {
            name: name.into(),
            call: Arc::new(call),
        }
    }

    /// The probe name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the probe. Failures are returned unchanged.
    pub fn invoke(&self) -> Result<serde_json::Value, ProbeError> {
        (self.call)()
    }

    pub(crate) fn prefixed(self, prefix: &str) -> Self {
        Self {
            name: format!("{}.{}", prefix, self.name),
            call: self.call,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe").field("name", &self.name).finish()
    }
}
