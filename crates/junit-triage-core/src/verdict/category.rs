//! Issue categories for failing test cases
//!
//! Every classified failure lands in exactly one of these buckets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root-cause bucket for a failing test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// The test's own comparison failed
    Assertion,
    /// The test script crashed or produced no recognizable error
    Script,
    /// An upstream service answered outside the 2xx range
    Infrastructure,
    /// A wrapped native error, typically config or database access
    ConfigOrDb,
}

impl IssueCategory {
    /// All categories in declaration order
    pub const ALL: [Self; 4] = [
        Self::Assertion,
        Self::Script,
        Self::Infrastructure,
        Self::ConfigOrDb,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assertion => "Assertion",
            Self::Script => "Script",
            Self::Infrastructure => "Infrastructure",
            Self::ConfigOrDb => "Config Or DB",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
