//! Reporter protocol and the read-only views it receives.

use thiserror::Error;

use crate::env::{Child, Environment, SpecId, SuiteId};
use crate::results::{NestedResults, SpecResults};

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("reporter callback `{callback}` is not valid while the reporter is {state}")]
    InvalidState {
        callback: &'static str,
        state: &'static str,
    },
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Observer of a run.
///
/// Callbacks arrive in this order: `report_runner_starting`, then per spec
/// `report_spec_starting` / `report_spec_results`, with `report_suite_results` once every child
/// of a suite has finished, and finally `report_runner_results`.
pub trait Reporter {
    fn report_runner_starting(&mut self, runner: &Runner<'_>) -> Result<(), ReporterError>;
    fn report_spec_starting(&mut self, spec: &Spec<'_>) -> Result<(), ReporterError>;
    fn report_spec_results(&mut self, spec: &Spec<'_>) -> Result<(), ReporterError>;
    fn report_suite_results(&mut self, suite: &Suite<'_>) -> Result<(), ReporterError>;
    fn report_runner_results(&mut self, runner: &Runner<'_>) -> Result<(), ReporterError>;
}

/// Reporter that ignores every callback. Used when none is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report_runner_starting(&mut self, _runner: &Runner<'_>) -> Result<(), ReporterError> {
        Ok(())
    }

    fn report_spec_starting(&mut self, _spec: &Spec<'_>) -> Result<(), ReporterError> {
        Ok(())
    }

    fn report_spec_results(&mut self, _spec: &Spec<'_>) -> Result<(), ReporterError> {
        Ok(())
    }

    fn report_suite_results(&mut self, _suite: &Suite<'_>) -> Result<(), ReporterError> {
        Ok(())
    }

    fn report_runner_results(&mut self, _runner: &Runner<'_>) -> Result<(), ReporterError> {
        Ok(())
    }
}

// ============================================================================
// Views
// ============================================================================

/// The whole run.
#[derive(Clone, Copy)]
pub struct Runner<'a> {
    env: &'a Environment,
}

impl<'a> Runner<'a> {
    pub(crate) fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    /// Expectation counts over every spec run so far.
    pub fn results(&self) -> NestedResults {
        let mut totals = NestedResults::default();
        for spec in &self.env.specs {
            totals.add(&spec.results);
        }
        totals
    }

    /// Every suite, nested ones included, in registration order.
    pub fn suites(&self) -> Vec<Suite<'a>> {
        (0..self.env.suites.len()).map(|i| Suite::new(self.env, SuiteId(i))).collect()
    }

    /// Every spec in registration order.
    pub fn specs(&self) -> Vec<Spec<'a>> {
        (0..self.env.specs.len()).map(|i| Spec::new(self.env, SpecId(i))).collect()
    }
}

#[derive(Clone, Copy)]
pub struct Suite<'a> {
    env: &'a Environment,
    id: SuiteId,
}

impl<'a> Suite<'a> {
    pub(crate) fn new(env: &'a Environment, id: SuiteId) -> Self {
        Self { env, id }
    }

    pub fn id(&self) -> SuiteId {
        self.id
    }

    pub fn description(&self) -> &'a str {
        &self.env.suites[self.id.0].description
    }

    pub fn parent(&self) -> Option<Suite<'a>> {
        self.env.suites[self.id.0].parent.map(|p| Suite::new(self.env, p))
    }

    /// Descriptions from the root suite down to this one, joined with spaces.
    pub fn full_description(&self) -> String {
        let mut path = vec![self.description()];
        let mut current = self.parent();
        while let Some(suite) = current {
            path.push(suite.description());
            current = suite.parent();
        }
        path.reverse();
        path.join(" ")
    }

    /// Specs declared directly in this suite, in registration order.
    pub fn specs(&self) -> Vec<Spec<'a>> {
        self.env.suites[self.id.0]
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Spec(id) => Some(Spec::new(self.env, *id)),
                Child::Suite(_) => None,
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct Spec<'a> {
    env: &'a Environment,
    id: SpecId,
}

impl<'a> Spec<'a> {
    pub(crate) fn new(env: &'a Environment, id: SpecId) -> Self {
        Self { env, id }
    }

    pub fn id(&self) -> SpecId {
        self.id
    }

    pub fn description(&self) -> &'a str {
        &self.env.specs[self.id.0].description
    }

    pub fn suite(&self) -> Suite<'a> {
        Suite::new(self.env, self.env.specs[self.id.0].suite)
    }

    pub fn results(&self) -> &'a SpecResults {
        &self.env.specs[self.id.0].results
    }
}
