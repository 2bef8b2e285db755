use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use polls::polls::{Clock, NewQuestion, PollRepository, PollService, QuestionRecord, ServiceError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

/// Sample questions relative to `now`: two live polls, one without choices, one scheduled.
pub(crate) fn seed_demo_questions<R, C>(
    service: &PollService<R, C>,
    now: DateTime<Utc>,
) -> Result<Vec<QuestionRecord>, ServiceError>
where
    R: PollRepository + 'static,
    C: Clock + 'static,
{
    let drafts = [
        (
            "Which course should we record next?",
            now - Duration::hours(3),
            vec!["Rust ownership", "Async in depth", "Testing web services"],
        ),
        (
            "Who is the best course director?",
            now - Duration::days(30),
            vec!["Freddy", "Nico", ""],
        ),
        ("Tabs or spaces?", now - Duration::days(2), Vec::new()),
        (
            "What should the next meetup cover?",
            now + Duration::days(7),
            vec!["Embedded", "WebAssembly"],
        ),
    ];

    drafts
        .into_iter()
        .map(|(question_text, pub_date, choices)| {
            service.create_question(NewQuestion {
                question_text: question_text.to_string(),
                pub_date,
                choices: choices.into_iter().map(str::to_string).collect(),
            })
        })
        .collect()
}
