//! Classification results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::IssueCategory;

/// Verdict for a single failure message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootCause {
    /// Triage bucket
    pub category: IssueCategory,
    /// Cleaned diagnostic text
    pub message: String,
}

impl RootCause {
    #[must_use]
    pub fn new(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// A failing test case paired with its root cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TestResult {
    /// Test case name as reported in the JUnit file
    pub test_case: String,
    pub root_cause: RootCause,
}

impl TestResult {
    #[must_use]
    pub fn new(test_case: impl Into<String>, root_cause: RootCause) -> Self {
        Self {
            test_case: test_case.into(),
            root_cause,
        }
    }

    #[must_use]
    pub const fn category(&self) -> IssueCategory {
        self.root_cause.category
    }
}
