//! JUnit XML report loading
//!
//! Decodes `<testsuites>` (or a bare `<testsuite>`) documents and selects the
//! failing test cases that are handed to the classifier, in document order.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use tracing::{debug, info};

use crate::summary::TriageReport;
use crate::verdict::{TestResult, classify};

/// Root of a JUnit report
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JunitReport {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "@tests", default)]
    pub tests: Option<String>,
    #[serde(rename = "@failures", default)]
    pub failures: Option<String>,
    #[serde(rename = "@errors", default)]
    pub errors: Option<String>,
    #[serde(rename = "@time", default)]
    pub time: Option<String>,
    #[serde(rename = "testsuite", default)]
    pub suites: Vec<TestSuite>,
}

/// A `<testsuite>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TestSuite {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "@tests", default)]
    pub tests: Option<String>,
    /// Kept verbatim; only the literal `"0"` marks a suite as passing
    #[serde(rename = "@failures", default)]
    pub failures: Option<String>,
    #[serde(rename = "@time", default)]
    pub time: Option<String>,
    #[serde(rename = "@timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "testcase", default)]
    pub cases: Vec<TestCase>,
}

/// A `<testcase>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@classname", default)]
    pub classname: Option<String>,
    #[serde(rename = "@time", default)]
    pub time: Option<String>,
    /// Usually zero or one; some reporters emit several
    #[serde(rename = "failure", default)]
    pub failures: Vec<FailureElement>,
}

impl TestCase {
    /// First `<failure>` carrying a non-empty `message` attribute
    #[must_use]
    pub fn reported_failure(&self) -> Option<&FailureElement> {
        self.failures
            .iter()
            .find(|f| !f.message.as_deref().unwrap_or_default().is_empty())
    }
}

/// A `<failure>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FailureElement {
    #[serde(rename = "@message", default)]
    pub message: Option<String>,
    #[serde(rename = "@type", default)]
    pub failure_type: Option<String>,
    /// Failure body, the text that gets classified
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// Which failing test cases are eligible for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRules {
    /// Substring a test case name must contain
    pub case_marker: String,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            case_marker: "Test_".to_string(),
        }
    }
}

/// A selected failing test case, borrowed from the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailingCase<'a> {
    pub suite: &'a str,
    pub name: &'a str,
    pub failure_text: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Malformed XML: {0}")]
    Xml(String),
    #[error("Unexpected root element <{0}>, expected <testsuites> or <testsuite>")]
    UnexpectedRoot(String),
    #[error("Report has no root element")]
    Empty,
}

impl FromStr for JunitReport {
    type Err = ReportError;

    fn from_str(xml: &str) -> Result<Self, Self::Err> {
        match root_element(xml)?.as_str() {
            "testsuites" => {
                quick_xml::de::from_str(xml).map_err(|e| ReportError::Xml(e.to_string()))
            }
            "testsuite" => {
                let suite: TestSuite =
                    quick_xml::de::from_str(xml).map_err(|e| ReportError::Xml(e.to_string()))?;
                Ok(Self {
                    tests: suite.tests.clone(),
                    failures: suite.failures.clone(),
                    time: suite.time.clone(),
                    suites: vec![suite],
                    ..Default::default()
                })
            }
            other => Err(ReportError::UnexpectedRoot(other.to_string())),
        }
    }
}

impl JunitReport {
    /// Load a report from disk
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a JUnit document
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let bytes =
            std::fs::read(path).map_err(|e| ReportError::Io(path.to_path_buf(), e.to_string()))?;
        let report: Self = String::from_utf8_lossy(&bytes).parse()?;
        debug!(
            path = %path.display(),
            suites = report.suites.len(),
            "loaded junit report"
        );
        Ok(report)
    }

    /// Failing test cases eligible for classification, in document order.
    ///
    /// A case is selected when its suite does not report `failures="0"`, its
    /// `<failure>` carries a non-empty `message` attribute, and its name
    /// contains the configured marker. With several `<failure>` elements the
    /// first one with a message is classified.
    #[must_use]
    pub fn failing_cases(&self, rules: &SelectionRules) -> Vec<FailingCase<'_>> {
        let mut selected = Vec::new();

        for suite in &self.suites {
            let suite_name = suite.name.as_deref().unwrap_or_default();
            if suite.failures.as_deref() == Some("0") {
                debug!(suite = suite_name, "skipping suite without failures");
                continue;
            }

            for case in &suite.cases {
                if case.failures.is_empty() {
                    continue;
                }
                let Some(failure) = case.reported_failure() else {
                    debug!(case = %case.name, "skipping failure without message");
                    continue;
                };
                if !case.name.contains(rules.case_marker.as_str()) {
                    debug!(case = %case.name, marker = %rules.case_marker, "skipping unmarked case");
                    continue;
                }
                selected.push(FailingCase {
                    suite: suite_name,
                    name: &case.name,
                    failure_text: &failure.text,
                });
            }
        }

        selected
    }

    /// Classify every selected failing case.
    #[must_use]
    pub fn triage(&self, rules: &SelectionRules) -> TriageReport {
        let results: Vec<TestResult> = self
            .failing_cases(rules)
            .into_iter()
            .map(|case| TestResult::new(case.name, classify(case.failure_text)))
            .collect();
        info!(failing = results.len(), "classified failing test cases");
        TriageReport::new(results)
    }
}

/// Local name of the first element in the document
fn root_element(xml: &str) -> Result<String, ReportError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader
            .read_event()
            .map_err(|e| ReportError::Xml(e.to_string()))?
        {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(ReportError::Empty),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{IssueCategory, PANIC_MESSAGE};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites tests="5" failures="3">
  <testsuite name="api/users" tests="3" failures="2" time="1.2" timestamp="2024-01-01T00:00:00">
    <properties>
      <property name="go.version" value="go1.21"></property>
    </properties>
    <testcase classname="api/users" name="Test_CreateUser" time="0.4">
      <failure message="Failed" type="">Error: expected 201 got 400
Test: Test_CreateUser</failure>
    </testcase>
    <testcase classname="api/users" name="Test_ListUsers" time="0.1"></testcase>
    <testcase classname="api/users" name="Test_DeleteUser" time="0.7">
      <failure message="Failed" type="">panic: runtime error: index out of range</failure>
    </testcase>
  </testsuite>
  <testsuite name="api/health" tests="1" failures="0" time="0.1">
    <testcase classname="api/health" name="Test_Health" time="0.1">
      <failure message="Failed" type="">Error: ignored because suite passed</failure>
    </testcase>
  </testsuite>
  <testsuite name="db" tests="1" failures="1" time="0.3">
    <testcase classname="db" name="Test_Connect" time="0.3">
      <failure message="Failed" type="">Error:  &amp;errors.errorString{s:"connection refused"}</failure>
    </testcase>
  </testsuite>
</testsuites>
"#;

    fn sample() -> JunitReport {
        SAMPLE.parse().unwrap()
    }

    #[test]
    fn parse_testsuites_document() {
        let report = sample();
        assert_eq!(report.failures.as_deref(), Some("3"));
        assert_eq!(report.suites.len(), 3);
        assert_eq!(report.suites[0].name.as_deref(), Some("api/users"));
        assert_eq!(report.suites[0].cases.len(), 3);
        assert!(report.suites[0].cases[1].failures.is_empty());

        let failure = report.suites[0].cases[0].reported_failure().unwrap();
        assert_eq!(failure.message.as_deref(), Some("Failed"));
        assert!(failure.text.contains("expected 201 got 400"));
    }

    #[test]
    fn failing_cases_in_document_order() {
        let report = sample();
        let names: Vec<&str> = report
            .failing_cases(&SelectionRules::default())
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Test_CreateUser", "Test_DeleteUser", "Test_Connect"]);
    }

    #[test]
    fn suite_with_zero_failures_is_skipped() {
        let report = sample();
        let cases = report.failing_cases(&SelectionRules::default());
        assert!(cases.iter().all(|c| c.suite != "api/health"));
    }

    #[test]
    fn triage_classifies_each_case() {
        let triage = sample().triage(&SelectionRules::default());
        let categories: Vec<IssueCategory> = triage.results.iter().map(|r| r.category()).collect();
        assert_eq!(
            categories,
            [
                IssueCategory::Assertion,
                IssueCategory::Script,
                IssueCategory::ConfigOrDb
            ]
        );
        assert_eq!(triage.results[0].root_cause.message, "expected 201 got 400");
        assert_eq!(triage.results[1].root_cause.message, PANIC_MESSAGE);
        assert_eq!(triage.results[2].root_cause.message, "connection refused");
        assert_eq!(triage.summary.total, 3);
    }

    #[test]
    fn missing_message_attribute_is_skipped() {
        let xml = r#"<testsuites>
  <testsuite name="s" failures="1">
    <testcase name="Test_NoMessage"><failure>Error: boom</failure></testcase>
    <testcase name="Test_EmptyMessage"><failure message="">Error: boom</failure></testcase>
  </testsuite>
</testsuites>"#;
        let report: JunitReport = xml.parse().unwrap();
        assert!(report.failing_cases(&SelectionRules::default()).is_empty());
    }

    #[test]
    fn unmarked_case_names_are_skipped() {
        let xml = r#"<testsuites>
  <testsuite name="s" failures="2">
    <testcase name="TestLegacy"><failure message="Failed">Error: a</failure></testcase>
    <testcase name="Test_Marked"><failure message="Failed">Error: b</failure></testcase>
  </testsuite>
</testsuites>"#;
        let report: JunitReport = xml.parse().unwrap();
        let cases = report.failing_cases(&SelectionRules::default());
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "Test_Marked");

        let rules = SelectionRules {
            case_marker: "Test".to_string(),
        };
        assert_eq!(report.failing_cases(&rules).len(), 2);
    }

    #[test]
    fn case_with_several_failures_uses_first_with_message() {
        let xml = r#"<testsuites>
  <testsuite name="s" failures="3">
    <testcase name="Test_A"><failure message="Failed">Error: only one</failure></testcase>
    <testcase name="Test_Retried">
      <failure message="">Error: no message attribute</failure>
      <failure message="Failed">Error: first attempt</failure>
      <failure message="Failed">Error: second attempt</failure>
    </testcase>
  </testsuite>
</testsuites>"#;
        let report: JunitReport = xml.parse().unwrap();
        assert_eq!(report.suites[0].cases[1].failures.len(), 3);

        let triage = report.triage(&SelectionRules::default());
        let messages: Vec<&str> = triage
            .results
            .iter()
            .map(|r| r.root_cause.message.as_str())
            .collect();
        assert_eq!(messages, ["only one", "first attempt"]);
    }

    #[test]
    fn missing_failures_attribute_is_not_treated_as_passing() {
        let xml = r#"<testsuites>
  <testsuite name="s">
    <testcase name="Test_A"><failure message="Failed">Error: a</failure></testcase>
  </testsuite>
</testsuites>"#;
        let report: JunitReport = xml.parse().unwrap();
        assert_eq!(report.failing_cases(&SelectionRules::default()).len(), 1);
    }

    #[test]
    fn bare_testsuite_root_is_wrapped() {
        let xml = r#"<?xml version="1.0"?>
<testsuite name="solo" tests="1" failures="1">
  <testcase name="Test_Solo"><failure message="Failed">Error: solo failure</failure></testcase>
</testsuite>"#;
        let report: JunitReport = xml.parse().unwrap();
        assert_eq!(report.suites.len(), 1);
        assert_eq!(report.failures.as_deref(), Some("1"));

        let triage = report.triage(&SelectionRules::default());
        assert_eq!(triage.results.len(), 1);
        assert_eq!(triage.results[0].root_cause.message, "solo failure");
    }

    #[test]
    fn unexpected_root_is_rejected() {
        let err = "<html><body/></html>".parse::<JunitReport>().unwrap_err();
        assert!(matches!(err, ReportError::UnexpectedRoot(ref name) if name == "html"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = "".parse::<JunitReport>().unwrap_err();
        assert!(matches!(err, ReportError::Empty));

        let err = r#"<?xml version="1.0"?>"#.parse::<JunitReport>().unwrap_err();
        assert!(matches!(err, ReportError::Empty));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let err = "<testsuites><testsuite></testsuites>"
            .parse::<JunitReport>()
            .unwrap_err();
        assert!(matches!(err, ReportError::Xml(_)));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = JunitReport::load(Path::new("/nonexistent/report.xml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/report.xml"));
    }
}
