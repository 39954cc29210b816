//! Verdict module - issue categories, root causes, and the classifier

mod category;
mod classifier;
mod root_cause;

pub use category::IssueCategory;
pub use classifier::{PANIC_MESSAGE, classify, extract_error_segment, normalize_message};
pub use root_cause::{RootCause, TestResult};
