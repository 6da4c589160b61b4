//! The grading engine.
//!
//! Grading a submission goes through these steps:
//!
//! 1. Provision an ephemeral project and build it exactly once
//! 2. Evaluate every definition, in order, against that build:
//!    compilation and code quality tests never need a successful build,
//!    functional tests fail with the compilation error when there is none
//! 3. Aggregate and remove the project
//!
//! Functional tests run sequentially against the same build artifacts.
//! Any infrastructure error fails every definition with the same message.

use std::path::Path;

use kata_project::{
    pipeline::{BuildRunPipeline, RunResult},
    prelude::Result,
    project::EphemeralProject,
};
use tracing::{debug, error};

use crate::{
    check::QualityCheck,
    definition::{TestDefinition, TestKind},
    matching::{args_from_command, output_matches},
    report::{TestResult, TestRunResult},
};

const QUALITY_CHECK_FAILED: &str = "Code quality check failed";
const MISSING_CHECK: &str = "Missing check expression";
const TEST_FAILED: &str = "Test failed";

/// Grades submissions against declarative test definitions.
#[derive(Debug, Clone, Default)]
pub struct GradingEngine {
    pipeline: BuildRunPipeline,
}

/// What a single build left for the tests to look at.
struct BuildOutcome {
    compilation_error: Option<String>,
}

impl BuildOutcome {
    fn succeeded(&self) -> bool {
        self.compilation_error.is_none()
    }
}

impl GradingEngine {
    pub fn new(pipeline: BuildRunPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &BuildRunPipeline {
        &self.pipeline
    }

    /// Grade `source` against `tests` in a fresh project.
    ///
    /// Never fails: infrastructure errors are reported in
    /// [`TestRunResult::execution_error`].
    pub async fn grade(&self, source: &str, tests: &[TestDefinition]) -> TestRunResult {
        let project = match EphemeralProject::create(source).await {
            Ok(project) => project,
            Err(err) => {
                error!("Failed to provision project - {err}");
                return TestRunResult::execution_failed(tests, &err.to_string());
            }
        };

        let result = self.grade_project(project.path(), source, tests).await;
        project.cleanup().await;

        result.unwrap_or_else(|err| {
            error!("Grading failed - {err}");
            TestRunResult::execution_failed(tests, &err.to_string())
        })
    }

    /// Grade against an already provisioned project.
    ///
    /// The caller owns the project and its cleanup.
    pub async fn grade_project(
        &self,
        project: &Path,
        source: &str,
        tests: &[TestDefinition],
    ) -> Result<TestRunResult> {
        let build = self.pipeline.build(project).await?;
        let build = BuildOutcome {
            compilation_error: (!build.success).then_some(build.stderr),
        };
        debug!(
            "Grading {} test(s), build succeeded: {}",
            tests.len(),
            build.succeeded()
        );

        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            results.push(self.evaluate(project, source, &build, test).await?);
        }

        Ok(TestRunResult::from_results(results).with_compilation_error(build.compilation_error))
    }

    async fn evaluate(
        &self,
        project: &Path,
        source: &str,
        build: &BuildOutcome,
        test: &TestDefinition,
    ) -> Result<TestResult> {
        let result = match &test.kind {
            TestKind::Compilation => match &build.compilation_error {
                None => TestResult::pass(test),
                Some(error) => TestResult::fail(test, error.as_str()),
            },
            TestKind::CodeQuality => evaluate_quality(source, test),
            TestKind::Functional => match &build.compilation_error {
                Some(error) => TestResult::fail(test, error.as_str()),
                None => {
                    let args = args_from_command(test.command.as_deref());
                    let run = self.pipeline.run_with_args(project, &args).await?;
                    evaluate_run(test, run)
                }
            },
            TestKind::Unknown(kind) => TestResult::fail(test, format!("Unknown test type: {kind}")),
        };
        debug!("Test '{}' passed: {}", test.name, result.passed);
        Ok(result)
    }
}

fn evaluate_quality(source: &str, test: &TestDefinition) -> TestResult {
    let Some(expression) = test.check.as_deref() else {
        return TestResult::fail(test, MISSING_CHECK);
    };
    if QualityCheck::parse(expression).evaluate(source) {
        TestResult::pass(test)
    } else {
        TestResult::fail(test, QUALITY_CHECK_FAILED)
    }
}

fn evaluate_run(test: &TestDefinition, run: RunResult) -> TestResult {
    let expected_exit_code = test.expected_exit_code();
    let stderr = run.stderr.trim();
    let mut failures = Vec::new();

    if run.exit_code != Some(expected_exit_code) {
        let actual = run
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| String::from("none"));
        let mut failure = format!("Expected exit code {expected_exit_code}, got {actual}");
        if !stderr.is_empty() {
            failure.push_str(": ");
            failure.push_str(stderr);
        }
        failures.push(failure);
    }
    let output_ok = match test.expected_output.as_deref() {
        Some(expected) if !output_matches(&run.stdout, expected) => {
            failures.push(format!(
                "Expected output {:?}, got {:?}",
                expected.trim(),
                run.stdout.trim()
            ));
            false
        }
        _ => true,
    };

    let passed = run.exit_code == Some(expected_exit_code) && output_ok;
    if passed {
        TestResult::pass(test).with_output(run.stdout)
    } else {
        TestResult::fail(test, failure_message(&failures, stderr)).with_output(run.stdout)
    }
}

/// Failed checks joined by `; `, else the trimmed stderr, else `Test failed`.
fn failure_message(failures: &[String], stderr: &str) -> String {
    if !failures.is_empty() {
        failures.join("; ")
    } else if !stderr.is_empty() {
        stderr.to_string()
    } else {
        String::from(TEST_FAILED)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use kata_project::pipeline::Toolchain;

    use super::*;

    const RUN_SCRIPT: &str = r#"shift
case "$1" in
    hang) echo "thread 'main' is stuck" >&2; exec sleep 30 ;;
    panic) echo "thread 'main' panicked at src/main.rs:3:5" >&2; exit 101 ;;
esac
echo "Count: ${1:-1}"
echo 'run log' >&2
exit ${2:-0}"#;

    /// Builds succeed unless the source contains `syntax error`; running
    /// prints `Count: <first arg or 1>` and exits with the second argument.
    /// The arguments `hang` and `panic` misbehave accordingly.
    fn fake_engine() -> GradingEngine {
        fake_engine_with_run_timeout(Duration::from_secs(10))
    }

    fn fake_engine_with_run_timeout(run_timeout: Duration) -> GradingEngine {
        let toolchain = Toolchain {
            program: String::from("sh"),
            build_args: vec![
                String::from("-c"),
                String::from(
                    "if grep -q 'syntax error' src/main.rs; then echo 'error: expected `;`' >&2; exit 101; fi",
                ),
            ],
            run_args: vec![
                String::from("-c"),
                String::from(RUN_SCRIPT),
                String::from("sh"),
            ],
        };
        GradingEngine::new(
            BuildRunPipeline::new(toolchain)
                .with_timeouts(Duration::from_secs(10), run_timeout),
        )
    }

    fn functional(name: &str) -> TestDefinition {
        TestDefinition::new(name, TestKind::Functional).with_command("cargo run")
    }

    #[tokio::test]
    async fn functional_test_passes() {
        let tests = vec![functional("prints").with_expected_output("Count: 1")];
        let run = fake_engine().grade("fn main() {}", &tests).await;

        assert!(run.success);
        assert_eq!(run.compilation_error, None);
        assert_eq!(run.results[0].output.as_deref(), Some("Count: 1\n"));
    }

    #[tokio::test]
    async fn functional_test_without_expected_output_checks_exit_code_only() {
        let tests = vec![
            functional("exits zero"),
            functional("exits three")
                .with_command("cargo run -- 1 3")
                .with_expected_exit_code(3),
        ];
        let run = fake_engine().grade("fn main() {}", &tests).await;

        assert!(run.success, "{run:?}");
    }

    #[tokio::test]
    async fn functional_failures_are_described() {
        let tests = vec![
            functional("wrong output").with_expected_output("Count: 2"),
            functional("wrong exit")
                .with_command("cargo run -- 1 4")
                .with_expected_output("Count: 1"),
            functional("both wrong")
                .with_command("cargo run -- 9 4")
                .with_expected_output("Count: 1"),
        ];
        let run = fake_engine().grade("fn main() {}", &tests).await;

        assert!(!run.success);
        assert_eq!(
            run.results[0].error.as_deref(),
            Some("Expected output \"Count: 2\", got \"Count: 1\"")
        );
        assert_eq!(
            run.results[1].error.as_deref(),
            Some("Expected exit code 0, got 4: run log")
        );
        assert_eq!(
            run.results[2].error.as_deref(),
            Some(
                "Expected exit code 0, got 4: run log; Expected output \"Count: 1\", got \"Count: 9\""
            )
        );
    }

    #[tokio::test]
    async fn timed_out_run_reports_the_timeout() {
        let tests = vec![functional("hangs").with_command("cargo run -- hang")];
        let run = fake_engine_with_run_timeout(Duration::from_millis(300))
            .grade("fn main() {}", &tests)
            .await;

        assert!(!run.success);
        assert_eq!(run.execution_error, None);
        assert_eq!(
            run.results[0].error.as_deref(),
            Some("Expected exit code 0, got 124: Timeout after 300ms")
        );
    }

    #[tokio::test]
    async fn panicking_run_reports_stderr() {
        let tests = vec![
            functional("panics")
                .with_command("cargo run -- panic")
                .with_expected_output("Count: 1"),
        ];
        let run = fake_engine().grade("fn main() {}", &tests).await;

        assert_eq!(
            run.results[0].error.as_deref(),
            Some(
                "Expected exit code 0, got 101: thread 'main' panicked at src/main.rs:3:5; \
                 Expected output \"Count: 1\", got \"\""
            )
        );
    }

    #[test]
    fn failure_message_fallbacks() {
        let failures = vec![String::from("a"), String::from("b")];
        assert_eq!(failure_message(&failures, "oops"), "a; b");
        assert_eq!(failure_message(&[], "oops"), "oops");
        assert_eq!(failure_message(&[], ""), TEST_FAILED);
    }

    #[tokio::test]
    async fn build_failure_gates_functional_tests() {
        let source = "fn main() { syntax error }";
        let tests = vec![
            TestDefinition::new("compiles", TestKind::Compilation),
            functional("prints").with_expected_output("Count: 1"),
            TestDefinition::new("uses main", TestKind::CodeQuality).with_check("contains 'fn main'"),
        ];
        let run = fake_engine().grade(source, &tests).await;

        let compilation_error = run.compilation_error.clone().unwrap();
        assert!(compilation_error.contains("error"));
        assert!(!run.success);
        assert_eq!(run.results[0].error.as_ref(), Some(&compilation_error));
        assert_eq!(run.results[1].error.as_ref(), Some(&compilation_error));
        assert_eq!(run.results[1].output, None);
        assert!(run.results[2].passed);
    }

    #[tokio::test]
    async fn quality_and_unknown_tests() {
        let tests = vec![
            TestDefinition::new("mutable", TestKind::CodeQuality).with_check("contains 'mut count'"),
            TestDefinition::new("no check", TestKind::CodeQuality),
            TestDefinition::new("weird check", TestKind::CodeQuality).with_check("has 'count'"),
            TestDefinition::new("mystery", TestKind::Unknown(String::from("benchmark"))),
        ];
        let run = fake_engine().grade("let count = 0;", &tests).await;

        let errors: Vec<_> = run.results.iter().map(|r| r.error.as_deref()).collect();
        assert_eq!(
            errors,
            vec![
                Some(QUALITY_CHECK_FAILED),
                Some(MISSING_CHECK),
                Some(QUALITY_CHECK_FAILED),
                Some("Unknown test type: benchmark"),
            ]
        );
    }

    #[tokio::test]
    async fn results_preserve_order_and_names() {
        let tests = vec![
            TestDefinition::new("b", TestKind::Compilation),
            TestDefinition::new("a", TestKind::Compilation),
            TestDefinition::new("b", TestKind::Compilation),
        ];
        let run = fake_engine().grade("fn main() {}", &tests).await;

        let names: Vec<_> = run.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert!(run.success);
    }

    #[tokio::test]
    async fn infrastructure_failure_fails_every_test() {
        let engine = GradingEngine::new(BuildRunPipeline::new(Toolchain {
            program: String::from("kata-no-such-toolchain"),
            build_args: Vec::new(),
            run_args: Vec::new(),
        }));
        let tests = vec![
            TestDefinition::new("compiles", TestKind::Compilation),
            TestDefinition::new("mutable", TestKind::CodeQuality).with_check("contains 'mut'"),
        ];
        let run = engine.grade("let mut x = 1;", &tests).await;

        let message = run.execution_error.clone().unwrap();
        assert!(message.contains("kata-no-such-toolchain"));
        assert!(!run.success);
        assert!(
            run.results
                .iter()
                .all(|r| !r.passed && r.error.as_ref() == Some(&message))
        );
    }
}
