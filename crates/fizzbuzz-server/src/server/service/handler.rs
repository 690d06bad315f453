//! HTTP service implementation for range FizzBuzz.
//!
//! This module defines [`FizzBuzzService`], which owns the shared
//! [`RangeEvaluator`] and exposes it as a single axum route.
//!
//! ## Responsibilities
//!
//! - Build the process-wide worker pool once at startup.
//! - Validate `from`/`to` query parameters before any work is scheduled.
//! - Tie each evaluation to the lifetime of its request, so a disconnected
//!   client cancels tasks that have not started yet.
//! - Log the range, the response body, and the latency of every request.

use crate::server::{
    config::ServerConfig,
    error::Error,
    telemetry::{
        InflightGuard, increment_requests, increment_requests_rejected,
        increment_slots_skipped, record_request_duration,
    },
};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use core::fmt::Write;
use fizzbuzz::{RangeEvaluator, WorkerPool};
use std::{sync::Arc, time::Instant};
use tower_http::trace::TraceLayer;

/// Path of the only route served.
pub const RANGE_FIZZBUZZ_PATH: &str = "/range-fizzbuzz";

/// Raw query parameters. Both bounds stay textual until the evaluator parses
/// them, so a missing or malformed bound is reported like any other invalid
/// input.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    /// Picks `from` and `to` out of decoded query pairs. When a key is
    /// repeated, its first value wins and later ones are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "from" => &mut query.from,
                "to" => &mut query.to,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Range FizzBuzz over a shared, bounded worker pool.
#[derive(Debug, Clone)]
pub struct FizzBuzzService {
    evaluator: RangeEvaluator,
}

impl FizzBuzzService {
    /// Creates the service and its worker pool on the current runtime.
    pub fn new(config: &ServerConfig) -> Self {
        let pool = Arc::new(WorkerPool::with_current_runtime(config.max_concurrency));
        Self::from_evaluator(RangeEvaluator::new(pool, config.limits()))
    }

    pub const fn from_evaluator(evaluator: RangeEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(RANGE_FIZZBUZZ_PATH, get(range_fizzbuzz))
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    /// Number of evaluations currently running.
    pub fn in_flight(&self) -> usize {
        self.evaluator.pool().in_flight()
    }

    /// Cancels all outstanding work and closes the worker pool.
    pub fn shutdown(&self) {
        self.evaluator.pool().shutdown();
    }
}

/// `GET /range-fizzbuzz?from=<int>&to=<int>`
///
/// Responds with the classifications of `from..=to` joined by single spaces
/// and terminated by a newline. Numbers not evaluated before the deadline are
/// empty tokens.
pub async fn range_fizzbuzz(
    State(service): State<FizzBuzzService>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<String, Error> {
    let start = Instant::now();
    increment_requests();

    let query = match query {
        Ok(Query(pairs)) => RangeQuery::from_pairs(pairs),
        Err(rejection) => {
            increment_requests_rejected();
            tracing::debug!("Rejected query string: {}", rejection.body_text());
            return Err(fizzbuzz::Error::InvalidInput {
                reason: rejection.body_text(),
            }
            .into());
        }
    };

    let evaluator = &service.evaluator;
    let range = evaluator
        .parse_range(query.from.as_deref(), query.to.as_deref())
        .inspect_err(|e| {
            increment_requests_rejected();
            tracing::debug!("Rejected range: {e}");
        })?;

    tracing::info!("Request: from={} to={}", range.from(), range.to());

    let _inflight = InflightGuard::start();
    let token = evaluator.pool().request_token();
    // Cancelled when this future is dropped, e.g. after a client disconnect.
    let _cancel_on_drop = token.clone().drop_guard();

    let evaluation = evaluator.evaluate_range(range, &token).await;

    let mut body = String::with_capacity(range.len() * 9);
    writeln!(body, "{evaluation}").map_err(|e| Error::WriteFailure {
        context: e.to_string(),
    })?;

    let skipped = evaluation.skipped();
    if skipped > 0 {
        increment_slots_skipped(skipped as u64);
        tracing::warn!(
            "Deadline elapsed: {skipped} of {} numbers left unevaluated",
            range.len()
        );
    }

    let latency = start.elapsed();
    record_request_duration(latency.as_secs_f64() * 1_000.0);

    tracing::info!("Response: {}", evaluation);
    tracing::info!("Latency: {latency:?}");

    Ok(body)
}
