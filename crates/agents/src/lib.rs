use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use hydro_core::{
    classify_briefing, format_issued_at, generate_briefing_markdown, local_rules, normalize_query,
    BriefingError, BriefingInput, BriefingReply, Classification, GeneratedBriefing,
    LocalBriefingReply,
};
use hydro_observability::AppMetrics;
use tracing::{debug, info, instrument};

/// Front door for the briefing operations. Query text is never recorded;
/// spans and events carry the matched topic and the query length only.
#[derive(Debug, Clone)]
pub struct BriefingAgent {
    metrics: Arc<AppMetrics>,
}

impl BriefingAgent {
    pub fn new(metrics: Arc<AppMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(skip_all)]
    pub fn answer(&self, query: Option<&str>) -> BriefingReply {
        let started = Instant::now();
        self.metrics.inc_request();

        let reply = match classify_briefing(query) {
            Some(classification) => {
                self.record(&classification, query);
                BriefingReply {
                    ok: true,
                    reply: classification.reply.to_string(),
                }
            }
            None => {
                self.metrics.inc_empty_query();
                debug!("empty briefing query");
                hydro_core::answer_briefing(None)
            }
        };

        self.metrics.observe_latency(started.elapsed());
        reply
    }

    #[instrument(skip_all)]
    pub fn answer_local(&self, query: Option<&str>) -> Result<LocalBriefingReply, BriefingError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let Some(normalized) = normalize_query(query) else {
            self.metrics.inc_empty_query();
            self.metrics.observe_latency(started.elapsed());
            return Err(BriefingError::EmptyQuery);
        };

        self.record(&local_rules().classify(normalized), query);
        let reply = hydro_core::answer_local(Some(normalized));

        self.metrics.observe_latency(started.elapsed());
        reply
    }

    #[instrument(skip_all, fields(
        stations = input.water_stations.len(),
        rainfall = input.rainfall.len(),
        alerts = input.alerts.len()
    ))]
    pub fn generate(&self, input: &BriefingInput) -> GeneratedBriefing {
        let started = Instant::now();
        self.metrics.inc_request();
        self.metrics.inc_generated();

        let issued_at = format_issued_at(&Local::now());
        let markdown = generate_briefing_markdown(input, &issued_at);
        info!(bytes = markdown.len(), "briefing generated");

        self.metrics.observe_latency(started.elapsed());
        GeneratedBriefing {
            ok: true,
            issued_at,
            markdown,
        }
    }

    fn record(&self, classification: &Classification, query: Option<&str>) {
        let chars = query.map(|text| text.chars().count()).unwrap_or_default();
        match classification.topic {
            Some(topic) => {
                self.metrics.inc_matched();
                info!(topic = topic.as_code(), chars, "briefing query matched");
            }
            None => {
                self.metrics.inc_fallback();
                info!(chars, "briefing query fell back");
            }
        }
    }
}
