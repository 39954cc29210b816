//! junit-triage-core: Root-cause classification for failing JUnit test cases
//!
//! This crate loads JUnit XML reports, classifies each failing test case's
//! failure message into an issue category, and renders the results.

pub mod report;
pub mod schema;
pub mod summary;
pub mod verdict;

pub use report::{FailingCase, JunitReport, ReportError, SelectionRules};
pub use summary::{TriageReport, TriageSummary};
pub use verdict::{IssueCategory, PANIC_MESSAGE, RootCause, TestResult, classify};
