//! Request and response bodies.

use kata_grader::TestDefinition;
use kata_project::pipeline::{BuildResult, RunResult};
use serde::{Deserialize, Serialize};

pub const NO_CODE_PROVIDED: &str = "No code provided";

/// Body of `POST /api/run`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Body of `POST /api/test`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub tests: Vec<TestDefinition>,
}

/// Response of `POST /api/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunResponse {
    /// The build succeeded and the program ran (possibly into its time limit).
    #[serde(rename_all = "camelCase")]
    Executed {
        success: bool,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },
    #[serde(rename_all = "camelCase")]
    CompilationFailed {
        success: bool,
        compilation_error: String,
        exit_code: Option<i32>,
    },
    /// Nothing to build.
    #[serde(rename_all = "camelCase")]
    Rejected {
        success: bool,
        compilation_error: String,
    },
    #[serde(rename_all = "camelCase")]
    ExecutionFailed {
        success: bool,
        execution_error: String,
    },
}

impl RunResponse {
    pub fn executed(run: RunResult) -> Self {
        Self::Executed {
            success: run.success,
            stdout: run.stdout,
            stderr: run.stderr,
            exit_code: run.exit_code,
        }
    }

    pub fn compilation_failed(build: BuildResult) -> Self {
        Self::CompilationFailed {
            success: false,
            compilation_error: build.stderr,
            exit_code: build.exit_code,
        }
    }

    pub fn no_code() -> Self {
        Self::Rejected {
            success: false,
            compilation_error: NO_CODE_PROVIDED.to_string(),
        }
    }

    pub fn execution_failed(error: impl ToString) -> Self {
        Self::ExecutionFailed {
            success: false,
            execution_error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn run_request_defaults() {
        let request: RunRequest = serde_json::from_str(r#"{ "code": "fn main() {}" }"#).unwrap();
        assert!(request.args.is_empty());

        let request: TestRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.code, "");
        assert!(request.tests.is_empty());
    }

    #[test]
    fn run_response_wire_shapes() {
        let executed = RunResponse::executed(RunResult {
            success: true,
            stdout: String::from("hi\n"),
            stderr: String::new(),
            exit_code: Some(0),
        });
        assert_eq!(
            serde_json::to_value(&executed).unwrap(),
            json!({ "success": true, "stdout": "hi\n", "stderr": "", "exitCode": 0 })
        );

        let failed = RunResponse::compilation_failed(BuildResult {
            success: false,
            stderr: String::from("error"),
            exit_code: Some(101),
        });
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "success": false, "compilationError": "error", "exitCode": 101 })
        );

        assert_eq!(
            serde_json::to_value(RunResponse::no_code()).unwrap(),
            json!({ "success": false, "compilationError": "No code provided" })
        );
        assert_eq!(
            serde_json::to_value(RunResponse::execution_failed("disk full")).unwrap(),
            json!({ "success": false, "executionError": "disk full" })
        );
    }
}
