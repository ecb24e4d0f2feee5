use crate::error::BriefingError;
use crate::models::{BriefingReply, LocalBriefingReply};
use crate::rules::{briefing_rules, local_rules, Classification, EMPTY_QUERY_PROMPT};

pub const LOCAL_REPLY_SOURCE: &str = "local-keyword";

/// Trims the raw query and returns `None` when nothing is left.
///
/// U+FEFF is stripped along with Unicode whitespace since browsers and some
/// form encoders leave a byte-order mark in front of pasted text.
pub fn normalize_query(raw: Option<&str>) -> Option<&str> {
    let trimmed = raw?.trim_matches(is_trimmable);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

// Unicode White_Space plus the byte-order mark, minus NEL (U+0085), which
// browsers and Node keep when trimming.
fn is_trimmable(ch: char) -> bool {
    ch == '\u{feff}' || (ch.is_whitespace() && ch != '\u{85}')
}

/// Classifies a query against the four-topic briefing table.
///
/// Returns `None` for a missing or blank query.
pub fn classify_briefing(raw: Option<&str>) -> Option<Classification> {
    normalize_query(raw).map(|query| briefing_rules().classify(query))
}

pub fn answer_briefing(raw: Option<&str>) -> BriefingReply {
    match classify_briefing(raw) {
        Some(classification) => BriefingReply {
            ok: true,
            reply: classification.reply.to_string(),
        },
        None => BriefingReply {
            ok: false,
            reply: EMPTY_QUERY_PROMPT.to_string(),
        },
    }
}

pub fn answer_local(raw: Option<&str>) -> Result<LocalBriefingReply, BriefingError> {
    let query = normalize_query(raw).ok_or(BriefingError::EmptyQuery)?;
    let classification = local_rules().classify(query);

    Ok(LocalBriefingReply {
        reply: classification.reply.to_string(),
        source: LOCAL_REPLY_SOURCE.to_string(),
    })
}
