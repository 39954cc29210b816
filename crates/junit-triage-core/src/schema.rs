//! JSON Schema for the `--output json` interchange format

use crate::summary::TriageReport;

/// Generate JSON Schema for [`TriageReport`].
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(TriageReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
