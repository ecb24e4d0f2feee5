pub mod classifier;
pub mod error;
pub mod models;
pub mod report;
pub mod rules;

pub use classifier::{answer_briefing, answer_local, classify_briefing, normalize_query};
pub use error::BriefingError;
pub use models::*;
pub use report::{format_issued_at, generate_briefing_markdown};
pub use rules::{briefing_rules, local_rules, Classification, KeywordRule, RuleTable};
