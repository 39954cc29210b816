//! Triage report: classified results, per-category counts, and rendering

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verdict::{IssueCategory, TestResult};

/// Per-category counts over all classified test cases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriageSummary {
    /// Number of failing test cases classified
    pub total: usize,
    pub assertion: usize,
    pub script: usize,
    pub infrastructure: usize,
    pub config_or_db: usize,
}

impl TriageSummary {
    #[must_use]
    pub fn from_results(results: &[TestResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.record(result.category());
            summary
        })
    }

    fn record(&mut self, category: IssueCategory) {
        self.total += 1;
        match category {
            IssueCategory::Assertion => self.assertion += 1,
            IssueCategory::Script => self.script += 1,
            IssueCategory::Infrastructure => self.infrastructure += 1,
            IssueCategory::ConfigOrDb => self.config_or_db += 1,
        }
    }

    /// Count for a single category
    #[must_use]
    pub const fn count(&self, category: IssueCategory) -> usize {
        match category {
            IssueCategory::Assertion => self.assertion,
            IssueCategory::Script => self.script,
            IssueCategory::Infrastructure => self.infrastructure,
            IssueCategory::ConfigOrDb => self.config_or_db,
        }
    }
}

/// Everything produced by one triage run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriageReport {
    /// Classified failing test cases, in document order
    pub results: Vec<TestResult>,
    pub summary: TriageSummary,
}

impl TriageReport {
    #[must_use]
    pub fn new(results: Vec<TestResult>) -> Self {
        let summary = TriageSummary::from_results(&results);
        Self { results, summary }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Human-readable rendering, one block per failing test case
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        for (i, result) in self.results.iter().enumerate() {
            lines.push(format!(
                "{} ------------- Test Case Name: {} -------------",
                i + 1,
                result.test_case
            ));
            lines.push(format!("Root Cause: {}", result.root_cause.message));
            lines.push(format!("Issue Type: {}", result.root_cause.category));
            lines.push("---------------------------------------------------".to_string());
        }

        if self.is_empty() {
            lines.push("No failing test cases found".to_string());
        } else {
            let breakdown: Vec<String> = IssueCategory::ALL
                .iter()
                .map(|&c| format!("{} {}", self.summary.count(c), c.as_str().to_lowercase()))
                .collect();
            lines.push(format!(
                "Summary: {} failing test cases ({})",
                self.summary.total,
                breakdown.join(", ")
            ));
        }

        lines.join("\n")
    }
}
