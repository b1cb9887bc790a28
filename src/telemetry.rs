use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUESTIONS_CREATED: IntCounter = register_int_counter!(
        "trivia_questions_created_total",
        "Number of questions created through the API"
    )
    .unwrap();
    pub static ref QUESTIONS_DELETED: IntCounter = register_int_counter!(
        "trivia_questions_deleted_total",
        "Number of questions deleted through the API"
    )
    .unwrap();
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounter = register_int_counter!(
        "trivia_quiz_questions_served_total",
        "Number of quiz questions handed out"
    )
    .unwrap();
    pub static ref QUIZZES_EXHAUSTED: IntCounter = register_int_counter!(
        "trivia_quizzes_exhausted_total",
        "Number of quiz requests with no question left in the category"
    )
    .unwrap();
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Encodes the default registry in the Prometheus text format, returns the body and its content type.
pub fn render_metrics() -> anyhow::Result<(Vec<u8>, String)> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf)?;
    Ok((buf, encoder.format_type().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_contains_counters() {
        QUIZ_QUESTIONS_SERVED.inc();
        let (body, content_type) = render_metrics().unwrap();
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("trivia_quiz_questions_served_total"));
        assert!(content_type.starts_with("text/plain"));
    }
}
