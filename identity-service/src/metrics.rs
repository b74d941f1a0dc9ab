use actix_web::{HttpResponse, Responder};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder};

fn register_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("valid metric definition");
    // Registration can only fail on duplicate names; the first
    // registration wins either way.
    let _ = prometheus::default_registry().register(Box::new(counter.clone()));
    counter
}

pub static TOKENS_ISSUED: Lazy<IntCounter> =
    Lazy::new(|| register_counter("auth_tokens_issued_total", "Tokens issued"));

pub static TOKENS_REVOKED: Lazy<IntCounter> =
    Lazy::new(|| register_counter("auth_tokens_revoked_total", "Tokens revoked via logout"));

pub static VALIDATION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "auth_validation_failures_total",
        "Remote validation requests that failed verification",
    )
});

/// Handler that serialises Prometheus metrics in text format.
pub async fn metrics_handler() -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
