use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::BriefingError;
use crate::models::Topic;

pub const EMPTY_QUERY_PROMPT: &str = "请提供问题文本（字段 q）。";
pub const BRIEFING_FALLBACK_REPLY: &str =
    "抱歉，我暂时无法回答该问题。请尝试“雨量”、“水位”、“未来趋势”等关键词。";
pub const LOCAL_FALLBACK_REPLY: &str =
    "很抱歉，未能理解您的问题。请尝试输入\"雨量\"、\"水位\"、\"未来趋势\"、\"超警\"等关键词。";

pub const RAINFALL_REPLY: &str =
    "过去24小时桂林市普降大到暴雨，部分县区局部降大暴雨，最大日雨量165.5毫米。";
pub const WATER_LEVEL_REPLY: &str = "漓江桂林水文站水位142.20米，流量154立方米每秒，未超警。";
pub const FORECAST_REPLY: &str = "预计未来24小时漓江桂林市城区至阳朔县城河段水位将继续上涨1.5～2米，桂江平乐县城河段上涨约1米，不会超警。";
pub const FLOOD_RISK_REPLY: &str =
    "部分中小河流可能出现超警洪水，主要集中在全州、恭城、永福、临桂、阳朔等县区。";
pub const AFFECTED_RIVERS_REPLY: &str = "恭城河、湘江全州县城河段、永福县大邦河、灌阳县秀江、雁山区良丰河等多条河流出现了1～2.6米的涨水。";

const BRIEFING_RULES: &[(Topic, &str, &str)] = &[
    (Topic::Rainfall, "雨量|降雨|暴雨", RAINFALL_REPLY),
    (Topic::WaterLevel, "水位|流量|桂林水文站", WATER_LEVEL_REPLY),
    (Topic::Forecast, "未来|预报|趋势", FORECAST_REPLY),
    (Topic::FloodRisk, "超警|洪水|风险", FLOOD_RISK_REPLY),
];

const AFFECTED_RIVERS_RULE: (Topic, &str, &str) = (
    Topic::AffectedRivers,
    "哪些河流|涨水|受影响",
    AFFECTED_RIVERS_REPLY,
);

static BRIEFING_TABLE: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(BRIEFING_RULES.iter().copied(), BRIEFING_FALLBACK_REPLY)
        .expect("valid briefing keyword patterns")
        .lowercased()
});

static LOCAL_TABLE: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(
        BRIEFING_RULES
            .iter()
            .copied()
            .chain(std::iter::once(AFFECTED_RIVERS_RULE)),
        LOCAL_FALLBACK_REPLY,
    )
    .expect("valid local keyword patterns")
});

/// The four-topic table behind `POST /api/briefing`.
pub fn briefing_rules() -> &'static RuleTable {
    &BRIEFING_TABLE
}

/// The extended table behind `POST /api/briefing/local`. Matching is
/// case-sensitive and includes the affected-rivers topic.
pub fn local_rules() -> &'static RuleTable {
    &LOCAL_TABLE
}

#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub topic: Topic,
    pattern: Regex,
    pub reply: &'static str,
}

impl KeywordRule {
    pub fn new(topic: Topic, pattern: &str, reply: &'static str) -> Result<Self, BriefingError> {
        let pattern = Regex::new(pattern)
            .map_err(|source| BriefingError::InvalidPattern { topic, source })?;
        Ok(Self {
            topic,
            pattern,
            reply,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub topic: Option<Topic>,
    pub reply: &'static str,
}

impl Classification {
    pub fn is_fallback(&self) -> bool {
        self.topic.is_none()
    }
}

/// Ordered keyword rules. Evaluation stops at the first matching rule.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
    fallback: &'static str,
    lowercase: bool,
}

impl RuleTable {
    pub fn new<I>(rules: I, fallback: &'static str) -> Result<Self, BriefingError>
    where
        I: IntoIterator<Item = (Topic, &'static str, &'static str)>,
    {
        let rules = rules
            .into_iter()
            .map(|(topic, pattern, reply)| KeywordRule::new(topic, pattern, reply))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            fallback,
            lowercase: false,
        })
    }

    /// Lowercase query text before matching.
    pub fn lowercased(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn lowercases(&self) -> bool {
        self.lowercase
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| Classification {
                topic: Some(rule.topic),
                reply: rule.reply,
            })
            .unwrap_or(Classification {
                topic: None,
                reply: self.fallback,
            })
    }
}
