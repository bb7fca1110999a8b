//! End-to-end runs over throwaway spec trees

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use specdrive::cli::ExitCode;
use specdrive::cli::commands::run_specs;
use specdrive::{FixtureRegistry, RunOptions, ScriptHost, SpecPatterns, SpecdriveConfig, execute_specs, load_helpers};
use tempfile::TempDir;

/// `Write` sink the test can read back after the run.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

const FOO_SPEC: &str = r#"
describe "foo" {
  it "sees the helper fixture" {
    expect(baz).to_equal(42)
  }
  it "fails on purpose" {
    expect(baz).to_equal(41)
  }
}
"#;

/// `spec/bdd` with `helpers/bar_helper.bdd` and `fooSpec.bdd`.
fn project() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let spec_dir = dir.path().join("spec/bdd");
    write(&spec_dir, "helpers/bar_helper.bdd", "export baz = 42\n");
    write(&spec_dir, "fooSpec.bdd", FOO_SPEC);
    (dir, spec_dir)
}

#[test]
fn test_helper_fixture_spec_run() {
    let (_dir, spec_dir) = project();
    let out = SharedBuffer::default();
    let config = SpecdriveConfig::new().with_spec_dir(&spec_dir);

    let code = run_specs(
        &config,
        &[spec_dir.clone()],
        RunOptions::new().with_colors(false).with_output(Box::new(out.clone())),
    )
    .unwrap();

    assert_eq!(code, ExitCode(-1));
    let output = out.contents();
    assert!(output.starts_with("Started\n.F\n\n"), "got: {}", output);
    assert!(output.contains("\nfoo\n  it fails on purpose\n  Expected 42 to equal 41.\n"));
    assert!(output.contains("fooSpec.bdd:7:5\n"), "got: {}", output);
    assert!(output.contains("\nFinished in "));
    assert!(output.ends_with("1 test, 2 assertions, 1 failure\n\n"), "got: {}", output);
}

#[test]
fn test_pipeline_by_hand_reports_log_to_on_complete() {
    let (_dir, spec_dir) = project();
    let patterns = SpecPatterns::from_extensions(&["bdd".to_string()]).unwrap();
    let mut host = ScriptHost::default();
    let mut fixtures = FixtureRegistry::new();

    let helpers = load_helpers(&spec_dir.join("helpers"), &patterns.helper, &mut host, &mut fixtures).unwrap();
    assert_eq!(helpers.len(), 1);
    assert!(fixtures.contains("baz"));

    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let options = RunOptions::new()
        .with_output(Box::new(io::sink()))
        .with_on_complete(move |runner, log| {
            let results = runner.results();
            *sink.borrow_mut() = Some((results.total_count, results.failed_count, log.to_vec()));
        });
    execute_specs(&[spec_dir], &patterns.spec, &mut host, &fixtures, options).unwrap();

    let (total, failed, log) = seen.borrow_mut().take().unwrap();
    assert_eq!((total, failed), (2, 1));
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], "foo");
    assert_eq!(log[1], "  it fails on purpose");
    assert!(log[2].starts_with("  Expected 42 to equal 41.\n    at "));
}

#[test]
fn test_nested_suites_and_async_specs() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "asyncSpec.bdd",
        r#"
let delay = 10

describe "timers" {
  let expected = [1, 2]

  it "resumes after done" {
    after delay done
    wait
    expect(expected).to_contain(2)
  }

  describe "when nothing signals" {
    it "times out" {
      wait 20
    }
  }
}
"#,
    );
    let out = SharedBuffer::default();
    let config = SpecdriveConfig::new().with_spec_dir(dir.path());
    let code = run_specs(
        &config,
        &[dir.path().to_path_buf()],
        RunOptions::new()
            .with_colors(false)
            .with_verbose(true)
            .with_output(Box::new(out.clone())),
    )
    .unwrap();

    assert_eq!(code, ExitCode(-1));
    let output = out.contents();
    assert!(output.contains("Spec timers when nothing signals\n  it times out\n  timeout waiting for spec\n"));
    assert!(output.contains("Spec timers\n  it resumes after done\n"));
    assert!(output.contains("2 tests, 2 assertions, 1 failure\n"));
}

#[test]
fn test_specs_are_discovered_in_every_naming_style() {
    let dir = TempDir::new().unwrap();
    for name in ["aSpec.bdd", "b_spec.bdd", "c-spec.bdd", "d_Spec.bdd", "spec.bdd", "eSpec.bdd.txt"] {
        write(
            dir.path(),
            &format!("nested/{}", name),
            &format!("describe \"{}\" {{ it \"runs\" {{ expect(1).to_be_truthy() }} }}", name),
        );
    }

    let suites = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&suites);
    let patterns = SpecPatterns::from_extensions(&["bdd".to_string()]).unwrap();
    execute_specs(
        &[dir.path().to_path_buf()],
        &patterns.spec,
        &mut ScriptHost::default(),
        &FixtureRegistry::new(),
        RunOptions::new()
            .with_output(Box::new(io::sink()))
            .with_on_complete(move |runner, _log| {
                sink.borrow_mut()
                    .extend(runner.suites().iter().map(|s| s.description().to_string()));
            }),
    )
    .unwrap();

    let mut names = suites.borrow().clone();
    names.sort();
    assert_eq!(names, vec!["aSpec.bdd", "b_spec.bdd", "c-spec.bdd", "d_Spec.bdd"]);
}
