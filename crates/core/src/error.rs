use thiserror::Error;

use crate::models::Topic;

#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("keyword pattern for topic `{}` does not compile", topic.as_code())]
    InvalidPattern {
        topic: Topic,
        #[source]
        source: regex::Error,
    },
    #[error("query text must not be empty")]
    EmptyQuery,
}
