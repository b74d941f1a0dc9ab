use actix_web::{HttpResponse, Responder};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder};

fn register_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("valid metric definition");
    let _ = prometheus::default_registry().register(Box::new(counter.clone()));
    counter
}

pub static REQUESTS_FORWARDED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "gateway_requests_forwarded_total",
        "Requests forwarded to an upstream",
    )
});

pub static UPSTREAM_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "gateway_upstream_failures_total",
        "Forwarding attempts that failed to reach the upstream",
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
