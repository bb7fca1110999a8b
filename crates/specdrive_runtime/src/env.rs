//! The test environment: suite tree, spec bodies and the execution loop.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::context::SpecContext;
use crate::reporter::{Reporter, ReporterError, Runner, SilentReporter, Spec, Suite};
use crate::results::SpecResults;
use crate::wait::DEFAULT_WAIT_TIMEOUT;

pub type SpecFuture = Pin<Box<dyn Future<Output = ()>>>;

/// A spec body: called once with its context, awaited to completion.
pub type SpecBody = Box<dyn FnOnce(SpecContext) -> SpecFuture>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuiteId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId(pub(crate) usize);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Child {
    Spec(SpecId),
    Suite(SuiteId),
}

pub(crate) struct SuiteNode {
    pub(crate) description: String,
    pub(crate) parent: Option<SuiteId>,
    pub(crate) children: Vec<Child>,
}

pub(crate) struct SpecNode {
    pub(crate) description: String,
    pub(crate) suite: SuiteId,
    pub(crate) body: Option<SpecBody>,
    pub(crate) results: SpecResults,
}

/// One unit of work in a run, in execution order.
#[derive(Debug, Clone, Copy)]
enum Step {
    Spec(SpecId),
    SuiteDone(SuiteId),
}

/// Registered suites and specs plus the reporter that observes the run.
pub struct Environment {
    pub(crate) suites: Vec<SuiteNode>,
    pub(crate) specs: Vec<SpecNode>,
    roots: Vec<SuiteId>,
    reporter: Option<Box<dyn Reporter>>,
    wait_timeout: Duration,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            suites: Vec::new(),
            specs: Vec::new(),
            roots: Vec::new(),
            reporter: None,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Timeout applied to `wait` in every spec context.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Register a suite under `parent` (or at the top level).
    pub fn describe(&mut self, parent: Option<SuiteId>, description: impl Into<String>) -> SuiteId {
        let id = SuiteId(self.suites.len());
        let description = description.into();
        tracing::debug!(suite = %description, nested = parent.is_some(), "registered suite");
        self.suites.push(SuiteNode {
            description,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.suites[p.0].children.push(Child::Suite(id)),
            None => self.roots.push(id),
        }
        id
    }

    /// Register a spec in `suite`.
    pub fn it(&mut self, suite: SuiteId, description: impl Into<String>, body: SpecBody) -> SpecId {
        let id = SpecId(self.specs.len());
        self.specs.push(SpecNode {
            description: description.into(),
            suite,
            body: Some(body),
            results: SpecResults::default(),
        });
        self.suites[suite.0].children.push(Child::Spec(id));
        id
    }

    /// Install the single reporter for the next run, replacing any previous one.
    pub fn set_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporter = Some(reporter);
    }

    pub fn runner(&self) -> Runner<'_> {
        Runner::new(self)
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// Run every registered spec in registration order, reporting as it goes.
    ///
    /// Each suite is reported once all of its children (specs and nested suites) have finished.
    /// Spec bodies are consumed; a spec runs at most once per environment.
    ///
    /// ## Errors
    /// Stops at the first reporter error.
    pub async fn execute(&mut self) -> Result<(), ReporterError> {
        let mut reporter = self.reporter.take().unwrap_or_else(|| Box::new(SilentReporter));
        let outcome = self.run_steps(reporter.as_mut()).await;
        self.reporter = Some(reporter);
        outcome
    }

    async fn run_steps(&mut self, reporter: &mut dyn Reporter) -> Result<(), ReporterError> {
        let steps = self.plan();
        tracing::debug!(
            suites = self.suites.len(),
            specs = self.specs.len(),
            "executing environment"
        );

        reporter.report_runner_starting(&self.runner())?;
        for step in steps {
            match step {
                Step::Spec(id) => {
                    reporter.report_spec_starting(&Spec::new(self, id))?;
                    let ctx = SpecContext::new(self.wait_timeout);
                    if let Some(body) = self.specs[id.0].body.take() {
                        body(ctx.clone()).await;
                    }
                    self.specs[id.0].results = SpecResults {
                        items: ctx.take_results(),
                    };
                    reporter.report_spec_results(&Spec::new(self, id))?;
                }
                Step::SuiteDone(id) => reporter.report_suite_results(&Suite::new(self, id))?,
            }
        }
        reporter.report_runner_results(&self.runner())
    }

    /// Flatten the suite tree into execution order.
    fn plan(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.suites.len() + self.specs.len());
        for root in &self.roots {
            self.plan_suite(*root, &mut steps);
        }
        steps
    }

    fn plan_suite(&self, id: SuiteId, steps: &mut Vec<Step>) {
        for child in &self.suites[id.0].children {
            match child {
                Child::Spec(spec) => steps.push(Step::Spec(*spec)),
                Child::Suite(suite) => self.plan_suite(*suite, steps),
            }
        }
        steps.push(Step::SuiteDone(id));
    }
}
