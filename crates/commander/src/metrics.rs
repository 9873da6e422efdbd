use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{CommanderError, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref TOOL_CALLS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "incident_commander_tool_calls_total",
                "Total number of tool invocations by tool and outcome.",
            ),
            &["tool", "outcome"],
        )
        .unwrap();
        REGISTRY
            .register(Box::new(counter.clone()))
            .expect("Failed to register TOOL_CALLS_TOTAL");
        counter
    };
    pub static ref BACKEND_REQUESTS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "incident_commander_backend_requests_total",
                "Total number of backend requests by operation and outcome.",
            ),
            &["operation", "outcome"],
        )
        .unwrap();
        REGISTRY
            .register(Box::new(counter.clone()))
            .expect("Failed to register BACKEND_REQUESTS_TOTAL");
        counter
    };
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

pub fn record_tool_call(tool: &str, success: bool) {
    TOOL_CALLS_TOTAL
        .with_label_values(&[tool, outcome(success)])
        .inc();
}

pub fn record_backend_request(operation: &str, success: bool) {
    BACKEND_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome(success)])
        .inc();
}

// Function to gather metrics for exposition
pub fn gather_metrics() -> Result<String> {
    // Touch the counters so they are registered before the first scrape.
    lazy_static::initialize(&TOOL_CALLS_TOTAL);
    lazy_static::initialize(&BACKEND_REQUESTS_TOTAL);

    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| CommanderError::Validation(e.to_string()))
}
