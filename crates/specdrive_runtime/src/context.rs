//! Per-spec execution context handed to spec bodies.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::matchers::Matcher;
use crate::results::ExpectationResult;
use crate::value::Value;
use crate::wait::AsyncWaitHandle;

/// Records expectation results for one spec and owns its wait handle.
///
/// Cheap to clone; clones append to the same result list.
#[derive(Debug, Clone)]
pub struct SpecContext {
    results: Rc<RefCell<Vec<ExpectationResult>>>,
    wait: AsyncWaitHandle,
}

impl SpecContext {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            results: Rc::new(RefCell::new(Vec::new())),
            wait: AsyncWaitHandle::new(wait_timeout),
        }
    }

    /// Start an expectation on `actual`.
    pub fn expect(&self, actual: Value) -> Expectation<'_> {
        Expectation {
            ctx: self,
            actual,
            negated: false,
            location: None,
        }
    }

    /// Record an unconditional failure.
    pub fn fail(&self, message: impl Into<String>, location: Option<&str>) {
        let message = message.into();
        let trace = trace(&message, location);
        self.record(ExpectationResult::fail(message, trace));
    }

    /// Signal `done()` on this spec's handle after `delay`, from a timer task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn done_after(&self, delay: Duration) {
        let handle = self.wait.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.done();
        });
    }

    /// Wait on `handle`; a timeout becomes a failed expectation.
    ///
    /// Returns `true` if `done()` arrived in time.
    pub async fn wait_for(&self, handle: &AsyncWaitHandle, location: Option<&str>) -> bool {
        match handle.wait().await {
            Ok(()) => true,
            Err(timeout) => {
                self.fail(timeout.to_string(), location);
                false
            }
        }
    }

    /// Wait on this spec's own handle, optionally with a different timeout.
    pub async fn wait(&self, timeout: Option<Duration>, location: Option<&str>) -> bool {
        let handle = match timeout {
            Some(t) => self.wait.with_timeout(t),
            None => self.wait.clone(),
        };
        self.wait_for(&handle, location).await
    }

    pub fn failed_count(&self) -> usize {
        self.results.borrow().iter().filter(|r| !r.passed).count()
    }

    /// Drain every recorded result.
    pub fn take_results(&self) -> Vec<ExpectationResult> {
        std::mem::take(&mut *self.results.borrow_mut())
    }

    fn record(&self, result: ExpectationResult) {
        self.results.borrow_mut().push(result);
    }
}

impl Default for SpecContext {
    fn default() -> Self {
        Self::new(crate::wait::DEFAULT_WAIT_TIMEOUT)
    }
}

/// Builder returned by [`SpecContext::expect`].
pub struct Expectation<'a> {
    ctx: &'a SpecContext,
    actual: Value,
    negated: bool,
    location: Option<String>,
}

impl Expectation<'_> {
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Attach a source location (`file:line:col`) to the failure trace.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Evaluate `matcher` and record the result. Returns whether the expectation passed.
    ///
    /// A matcher error (bad arity, invalid pattern) is recorded as a failure.
    pub fn to(self, matcher: Matcher, expected: &[Value]) -> bool {
        let location = self.location.as_deref();
        let result = match matcher.evaluate(&self.actual, expected) {
            Ok(matched) if matched != self.negated => ExpectationResult::pass("Passed."),
            Ok(_) => {
                let message = matcher.message(&self.actual, expected, self.negated);
                let trace = trace(&message, location);
                ExpectationResult::fail(message, trace)
            }
            Err(err) => {
                let message = err.to_string();
                let trace = trace(&message, location);
                ExpectationResult::fail(message, trace)
            }
        };
        let passed = result.passed;
        self.ctx.record(result);
        passed
    }
}

fn trace(message: &str, location: Option<&str>) -> String {
    match location {
        Some(loc) => format!("{}\n    at {}", message, loc),
        None => message.to_string(),
    }
}
