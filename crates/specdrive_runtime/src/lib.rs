//! Behavior-testing runtime for specdrive.
//!
//! The runtime owns the suite tree, runs spec bodies one after another on the caller's
//! executor, collects expectation results and drives a [`Reporter`] through its five callbacks.
//! It knows nothing about files or scripts; the host registers suites with closures.
//!
//! ```rust
//! use specdrive_runtime::{Environment, Matcher, SpecContext, SpecFuture, Value};
//!
//! let mut env = Environment::new();
//! let suite = env.describe(None, "math");
//! env.it(suite, "adds", Box::new(|ctx: SpecContext| -> SpecFuture {
//!     Box::pin(async move {
//!         ctx.expect(Value::Int(2)).to(Matcher::ToEqual, &[Value::Int(2)]);
//!     })
//! }));
//! let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! rt.block_on(env.execute()).unwrap();
//! assert_eq!(env.runner().results().failed_count, 0);
//! ```

#![deny(clippy::unwrap_used)]

pub mod context;
pub mod env;
pub mod matchers;
pub mod reporter;
pub mod results;
pub mod value;
pub mod wait;

pub use context::{Expectation, SpecContext};
pub use env::{Environment, SpecBody, SpecFuture, SpecId, SuiteId};
pub use matchers::{Matcher, MatcherError};
pub use reporter::{Reporter, ReporterError, Runner, SilentReporter, Spec, Suite};
pub use results::{ExpectationResult, NestedResults, SpecResults};
pub use value::Value;
pub use wait::{AsyncWaitHandle, DEFAULT_WAIT_TIMEOUT, WaitTimeout};
