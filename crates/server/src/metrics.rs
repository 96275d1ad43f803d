//! Prometheus metrics
//!
//! The recorder is installed once per process; `record_*` calls are no-ops
//! until then.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use finspeak_core::{Answer, AnswerData, ExplanationSource, IntentKind};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder; `None` when another recorder is already set
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map_err(|e| tracing::warn!(error = %e, "Failed to install metrics recorder"))
        .ok()
        .cloned()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled".to_string()),
    }
}

/// Count a resolved query by intent and outcome, and its latency
pub fn record_query(answer: &Answer, elapsed: Duration) {
    let intent = answer.intent.as_str();
    let outcome = answer.error_kind.map(|k| k.as_str()).unwrap_or("success");
    metrics::counter!("finspeak_queries_total", "intent" => intent, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("finspeak_resolve_duration_seconds", "intent" => intent)
        .record(elapsed.as_secs_f64());
}

/// Count an answer from `/api/query`; explain intents also count as explanations
pub fn record_answer(answer: &Answer, elapsed: Duration) {
    record_query(answer, elapsed);
    if answer.intent == IntentKind::Explain {
        record_explanation(explanation_source(answer));
    }
}

fn explanation_source(answer: &Answer) -> Option<ExplanationSource> {
    match &answer.data {
        Some(AnswerData::Explanation { source, .. }) => Some(*source),
        _ => None,
    }
}

/// Count an explanation by source ("unavailable" on failure)
pub fn record_explanation(source: Option<ExplanationSource>) {
    let source = source.map(|s| s.as_str()).unwrap_or("unavailable");
    metrics::counter!("finspeak_explanations_total", "source" => source).increment(1);
}

pub fn record_reload(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("finspeak_reloads_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use finspeak_core::{ErrorKind, Language};
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn render(answers: &[Answer]) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            for answer in answers {
                record_answer(answer, Duration::from_millis(2));
            }
        });
        handle.render()
    }

    #[test]
    fn test_query_explanations_are_counted() {
        let curated = Answer::success(
            IntentKind::Explain,
            Language::English,
            "NAV is ...",
            AnswerData::Explanation {
                term: "nav".to_string(),
                source: ExplanationSource::Curated,
            },
        );
        let unavailable = Answer::failure(
            IntentKind::Explain,
            Language::English,
            ErrorKind::ExplanationUnavailable,
            "no explanation",
        );

        let rendered = render(&[curated, unavailable]);
        assert!(rendered.contains(r#"finspeak_explanations_total{source="curated"} 1"#));
        assert!(rendered.contains(r#"finspeak_explanations_total{source="unavailable"} 1"#));
        assert!(rendered.contains(r#"finspeak_queries_total{intent="explain",outcome="success"} 1"#));
    }

    #[test]
    fn test_other_intents_are_not_explanations() {
        let unknown = Answer::failure(
            IntentKind::Unknown,
            Language::Hindi,
            ErrorKind::UnrecognizedQuery,
            "not understood",
        );

        let rendered = render(&[unknown]);
        assert!(!rendered.contains("finspeak_explanations_total"));
        assert!(rendered.contains("finspeak_queries_total"));
    }
}
