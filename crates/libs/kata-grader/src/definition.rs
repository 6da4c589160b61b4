//! Caller-supplied test definitions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const MISSING_KIND: &str = "<missing>";

/// What a test definition checks.
///
/// Parsed from the `type` field. Unrecognised values are kept so the engine
/// can fail them with a message naming the type. A missing or non-string
/// `type` is unknown too, never a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum TestKind {
    /// The submission builds.
    Compilation,
    /// The source text satisfies a [`crate::check::QualityCheck`].
    CodeQuality,
    /// Running the program produces the expected exit code and output.
    Functional,
    Unknown(String),
}

impl From<String> for TestKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "compilation" => Self::Compilation,
            "code_quality" => Self::CodeQuality,
            "functional" => Self::Functional,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Value> for TestKind {
    fn from(value: Value) -> Self {
        match value {
            Value::String(kind) => Self::from(kind),
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl Default for TestKind {
    fn default() -> Self {
        Self::Unknown(String::from(MISSING_KIND))
    }
}

impl From<TestKind> for String {
    fn from(value: TestKind) -> Self {
        match value {
            TestKind::Compilation => String::from("compilation"),
            TestKind::CodeQuality => String::from("code_quality"),
            TestKind::Functional => String::from("functional"),
            TestKind::Unknown(kind) => kind,
        }
    }
}

impl Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}

/// One declarative rule about a submission.
///
/// Names are unique within a request, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TestKind,
    #[serde(default)]
    pub description: String,
    /// Human-authored invocation, e.g. `cargo run -- 32 F`.
    pub command: Option<String>,
    pub expected_output: Option<String>,
    /// Defaults to 0 when absent.
    pub expected_exit_code: Option<i32>,
    /// Quality predicate, e.g. `contains 'mut count'`.
    pub check: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl TestDefinition {
    pub fn new(name: impl Into<String>, kind: TestKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            command: None,
            expected_output: None,
            expected_exit_code: None,
            check: None,
            hidden: false,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_expected_output(mut self, output: impl Into<String>) -> Self {
        self.expected_output = Some(output.into());
        self
    }

    pub fn with_expected_exit_code(mut self, code: i32) -> Self {
        self.expected_exit_code = Some(code);
        self
    }

    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = Some(check.into());
        self
    }

    pub fn expected_exit_code(&self) -> i32 {
        self.expected_exit_code.unwrap_or(0)
    }
}
