//! Grading results.

use serde::{Deserialize, Serialize};

use crate::definition::TestDefinition;

/// Verdict for a single test definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub hidden: bool,
}

impl TestResult {
    pub fn pass(test: &TestDefinition) -> Self {
        Self {
            name: test.name.clone(),
            passed: true,
            error: None,
            output: None,
            hidden: test.hidden,
        }
    }

    pub fn fail(test: &TestDefinition, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            ..Self::pass(test)
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Aggregate verdict for one grading request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResult {
    /// True iff every result passed.
    pub success: bool,
    pub results: Vec<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compilation_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub execution_error: Option<String>,
}

impl TestRunResult {
    pub fn from_results(results: Vec<TestResult>) -> Self {
        Self {
            success: results.iter().all(|result| result.passed),
            results,
            compilation_error: None,
            execution_error: None,
        }
    }

    /// Every definition failed with the same message.
    pub fn all_failed(tests: &[TestDefinition], message: &str) -> Self {
        let mut run = Self::from_results(
            tests
                .iter()
                .map(|test| TestResult::fail(test, message))
                .collect(),
        );
        // An empty test list still must not report success
        run.success = false;
        run
    }

    /// An infrastructure fault prevented grading.
    pub fn execution_failed(tests: &[TestDefinition], message: &str) -> Self {
        Self {
            execution_error: Some(message.to_string()),
            ..Self::all_failed(tests, message)
        }
    }

    pub fn with_compilation_error(mut self, error: Option<String>) -> Self {
        self.compilation_error = error;
        self
    }
}
