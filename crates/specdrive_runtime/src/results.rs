//! Expectation and spec results.

/// Outcome of a single expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectationResult {
    pub passed: bool,
    pub message: String,
    /// Message followed by the source location; empty for passing expectations.
    pub trace: String,
}

impl ExpectationResult {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            trace: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            trace: trace.into(),
        }
    }
}

/// Every expectation recorded by one spec, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecResults {
    pub items: Vec<ExpectationResult>,
}

impl SpecResults {
    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn passed_count(&self) -> usize {
        self.items.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|r| !r.passed).count()
    }

    /// A spec passes when none of its expectations failed (including when it made none).
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExpectationResult> {
        self.items.iter().filter(|r| !r.passed)
    }
}

/// Expectation counts aggregated over many specs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NestedResults {
    pub total_count: usize,
    pub passed_count: usize,
    pub failed_count: usize,
}

impl NestedResults {
    pub fn add(&mut self, spec: &SpecResults) {
        self.total_count += spec.total_count();
        self.passed_count += spec.passed_count();
        self.failed_count += spec.failed_count();
    }
}
