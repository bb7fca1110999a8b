//! Console reporter: progress glyphs while specs run, then the buffered log and a summary.
//!
//! Output during a run is limited to one glyph per spec (`.` pass, `F` fail) plus the wrapping
//! newline every 50 glyphs. Failure details are collected in a log and printed only after the
//! last suite has reported.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use specdrive_runtime::{Reporter, ReporterError, Runner, Spec, Suite};

use crate::runner::OnComplete;

/// Glyphs printed on one line before wrapping
pub const GLYPHS_PER_LINE: usize = 50;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// `"<N> test(s), <M> assertion(s), <K> failure(s)\n"`, singular only for a count of exactly 1.
pub fn format_summary(suites: usize, assertions: usize, failures: usize) -> String {
    format!(
        "{} {}, {} {}, {} {}\n",
        suites,
        plural(suites, "test"),
        assertions,
        plural(assertions, "assertion"),
        failures,
        plural(failures, "failure"),
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 { noun.to_string() } else { format!("{}s", noun) }
}

/// Counts shown at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Every suite, nested ones included
    pub suites: usize,
    /// Expectations evaluated
    pub assertions: usize,
    /// Expectations that failed
    pub failures: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_runner(runner: &Runner<'_>, elapsed: Duration) -> Self {
        let results = runner.results();
        Self {
            suites: runner.suites().len(),
            assertions: results.total_count,
            failures: results.failed_count,
            elapsed,
        }
    }

    /// Elapsed milliseconds divided by 1000.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_millis() as f64 / 1000.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_summary(self.suites, self.assertions, self.failures))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Finished,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Running => "running",
            State::Finished => "finished",
        }
    }
}

pub struct ConsoleReporter {
    verbose: bool,
    show_colors: bool,
    on_complete: Option<OnComplete>,
    out: Box<dyn Write>,
    log: Vec<String>,
    column_counter: usize,
    started: Option<Instant>,
    state: State,
}

impl ConsoleReporter {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            verbose: false,
            show_colors: true,
            on_complete: None,
            out,
            log: Vec::new(),
            column_counter: 0,
            started: None,
            state: State::Idle,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    pub fn with_on_complete(mut self, on_complete: Option<OnComplete>) -> Self {
        self.on_complete = on_complete;
        self
    }

    fn require(&self, expected: State, callback: &'static str) -> Result<(), ReporterError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReporterError::InvalidState {
                callback,
                state: self.state.name(),
            })
        }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report_runner_starting(&mut self, _runner: &Runner<'_>) -> Result<(), ReporterError> {
        self.require(State::Idle, "report_runner_starting")?;
        self.state = State::Running;
        writeln!(self.out, "Started")?;
        self.started = Some(Instant::now());
        Ok(())
    }

    fn report_spec_starting(&mut self, _spec: &Spec<'_>) -> Result<(), ReporterError> {
        self.require(State::Running, "report_spec_starting")
    }

    fn report_spec_results(&mut self, spec: &Spec<'_>) -> Result<(), ReporterError> {
        self.require(State::Running, "report_spec_results")?;
        if self.column_counter == GLYPHS_PER_LINE {
            writeln!(self.out)?;
            self.column_counter = 0;
        }
        let glyph = if spec.results().passed() {
            self.paint(".", GREEN)
        } else {
            self.paint("F", RED)
        };
        write!(self.out, "{}", glyph)?;
        self.out.flush()?;
        self.column_counter += 1;
        Ok(())
    }

    fn report_suite_results(&mut self, suite: &Suite<'_>) -> Result<(), ReporterError> {
        self.require(State::Running, "report_suite_results")?;
        let description = suite.full_description();
        if self.verbose {
            self.log.push(format!("Spec {}", description));
        }

        let mut header_logged = self.verbose;
        for spec in suite.specs() {
            let results = spec.results();
            if results.failed_count() > 0 && !spec.description().is_empty() {
                if !header_logged {
                    self.log.push(description.clone());
                    header_logged = true;
                }
                self.log.push(format!("  it {}", spec.description()));
                for failure in results.failures() {
                    self.log.push(format!("  {}\n", failure.trace));
                }
            } else if self.verbose {
                self.log.push(format!("  it {}", spec.description()));
            }
        }
        Ok(())
    }

    fn report_runner_results(&mut self, runner: &Runner<'_>) -> Result<(), ReporterError> {
        self.require(State::Running, "report_runner_results")?;
        self.state = State::Finished;

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        let summary = RunSummary::from_runner(runner, elapsed);

        write!(self.out, "\n\n")?;
        for line in &self.log {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "Finished in {} seconds", summary.elapsed_secs())?;
        let color = if summary.failures == 0 { GREEN } else { RED };
        let painted = self.paint(&summary.to_string(), color);
        writeln!(self.out, "{}", painted)?;
        self.out.flush()?;

        tracing::debug!(
            suites = summary.suites,
            assertions = summary.assertions,
            failures = summary.failures,
            "run finished"
        );
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(runner, &self.log);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specdrive_runtime::{Environment, Matcher, SpecBody, SpecContext, SpecFuture, Value};
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// `Write` sink shared with the test.
    #[derive(Clone, Default)]
    struct Buffer(Rc<RefCell<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn equal(actual: i64, expected: i64) -> SpecBody {
        Box::new(move |ctx: SpecContext| -> SpecFuture {
            Box::pin(async move {
                ctx.expect(Value::Int(actual))
                    .at("fooSpec.bdd:3:5")
                    .to(Matcher::ToEqual, &[Value::Int(expected)]);
            })
        })
    }

    fn sample_env() -> Environment {
        let mut env = Environment::new();
        let outer = env.describe(None, "foo");
        env.it(outer, "passes", equal(1, 1));
        let inner = env.describe(Some(outer), "bar");
        env.it(inner, "fails", equal(1, 2));
        env
    }

    fn run(env: &mut Environment, reporter: ConsoleReporter) {
        env.set_reporter(Box::new(reporter));
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(env.execute()).unwrap();
    }

    /// Output with the timing line removed.
    fn stable(output: &str) -> String {
        output
            .lines()
            .filter(|l| !l.starts_with("Finished in "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========================================================================
    // Summary
    // ========================================================================

    #[test]
    fn test_summary_pluralization() {
        assert_eq!(format_summary(1, 1, 1), "1 test, 1 assertion, 1 failure\n");
        assert_eq!(format_summary(0, 2, 0), "0 tests, 2 assertions, 0 failures\n");
        assert_eq!(format_summary(3, 10, 2), "3 tests, 10 assertions, 2 failures\n");
    }

    #[test]
    fn test_elapsed_is_millis_over_1000() {
        let summary = RunSummary {
            suites: 0,
            assertions: 0,
            failures: 0,
            elapsed: Duration::from_micros(12_999),
        };
        assert_eq!(summary.elapsed_secs(), 0.012);
    }

    // ========================================================================
    // Console output
    // ========================================================================

    #[test]
    fn test_plain_output() {
        let buf = Buffer::default();
        let mut env = sample_env();
        run(
            &mut env,
            ConsoleReporter::new(Box::new(buf.clone())).with_colors(false),
        );

        insta::assert_snapshot!(stable(&buf.contents()), @r"
        Started
        .F

        foo bar
          it fails
          Expected 1 to equal 2.
            at fooSpec.bdd:3:5

        2 tests, 2 assertions, 1 failure
        ");
    }

    #[test]
    fn test_verbose_log_lists_every_spec() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut env = sample_env();
        run(
            &mut env,
            ConsoleReporter::new(Box::new(io::sink()))
                .with_verbose(true)
                .with_on_complete(Some(Box::new(move |_runner: &Runner<'_>, lines: &[String]| {
                    sink.borrow_mut().extend_from_slice(lines);
                }))),
        );

        assert_eq!(
            *log.borrow(),
            vec![
                "Spec foo bar".to_string(),
                "  it fails".to_string(),
                "  Expected 1 to equal 2.\n    at fooSpec.bdd:3:5\n".to_string(),
                "Spec foo".to_string(),
                "  it passes".to_string(),
            ]
        );
    }

    #[test]
    fn test_passing_specs_log_nothing_when_quiet() {
        let mut env = Environment::new();
        let suite = env.describe(None, "ok");
        env.it(suite, "one", equal(1, 1));
        let buf = Buffer::default();
        run(&mut env, ConsoleReporter::new(Box::new(buf.clone())).with_colors(false));
        assert!(buf.contents().starts_with("Started\n.\n\nFinished in "));
    }

    #[test]
    fn test_suite_header_logged_once_for_many_failures() {
        let mut env = Environment::new();
        let suite = env.describe(None, "math");
        env.it(suite, "a", equal(1, 2));
        env.it(suite, "b", equal(3, 4));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        run(
            &mut env,
            ConsoleReporter::new(Box::new(io::sink())).with_on_complete(Some(Box::new(
                move |_runner: &Runner<'_>, lines: &[String]| sink.borrow_mut().extend_from_slice(lines),
            ))),
        );
        let log = log.borrow();
        assert_eq!(log.iter().filter(|l| *l == "math").count(), 1);
        assert_eq!(log[0], "math");
        assert_eq!(log[1], "  it a");
        assert_eq!(log[3], "  it b");
    }

    #[test]
    fn test_colors() {
        let buf = Buffer::default();
        let mut env = sample_env();
        run(&mut env, ConsoleReporter::new(Box::new(buf.clone())));
        let out = buf.contents();
        assert!(out.contains("\x1b[32m.\x1b[0m\x1b[31mF\x1b[0m"));
        assert!(out.ends_with("\x1b[31m2 tests, 2 assertions, 1 failure\n\x1b[0m\n"));
    }

    #[test]
    fn test_glyphs_wrap_after_fifty() {
        let mut env = Environment::new();
        let suite = env.describe(None, "many");
        for i in 0..101 {
            env.it(suite, format!("spec {}", i), equal(1, 1));
        }
        let buf = Buffer::default();
        run(&mut env, ConsoleReporter::new(Box::new(buf.clone())).with_colors(false));

        let out = buf.contents();
        let glyphs: Vec<&str> = out.lines().skip(1).take(3).collect();
        assert_eq!(glyphs, vec![".".repeat(50), ".".repeat(50), ".".to_string()]);
    }

    #[test]
    fn test_on_complete_runs_once_with_runner() {
        let failed = Rc::new(RefCell::new(None));
        let seen = Rc::clone(&failed);
        let mut env = sample_env();
        run(
            &mut env,
            ConsoleReporter::new(Box::new(io::sink())).with_on_complete(Some(Box::new(
                move |runner: &Runner<'_>, _lines: &[String]| {
                    *seen.borrow_mut() = Some(runner.results().failed_count);
                },
            ))),
        );
        assert_eq!(*failed.borrow(), Some(1));
    }

    // ========================================================================
    // State machine
    // ========================================================================

    #[test]
    fn test_callbacks_out_of_order_are_rejected() {
        let env = sample_env();
        let runner = env.runner();
        let mut reporter = ConsoleReporter::new(Box::new(io::sink()));

        let err = reporter.report_runner_results(&runner).unwrap_err();
        assert!(matches!(
            err,
            ReporterError::InvalidState {
                callback: "report_runner_results",
                state: "idle"
            }
        ));

        reporter.report_runner_starting(&runner).unwrap();
        assert!(reporter.report_runner_starting(&runner).is_err());
        reporter.report_runner_results(&runner).unwrap();

        let err = reporter.report_suite_results(&runner.suites()[0]).unwrap_err();
        assert!(matches!(err, ReporterError::InvalidState { state: "finished", .. }));
    }
}
