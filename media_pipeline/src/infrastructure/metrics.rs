// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics: stage durations, cost accrual, cache hit rate, and
//! budget utilization, served on an HTTP endpoint.

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

/// Holds the process's metric registry and the individual collectors the
/// orchestrator and cache layers report into. One instance is shared
/// (`Arc`) across a run.
pub struct MetricsService {
    registry: Registry,
    stage_duration_seconds: Histogram,
    stage_cost_usd: Histogram,
    cache_lookups: IntCounterVec,
    stage_outcomes: IntCounterVec,
}

impl MetricsService {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let stage_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "media_pipeline_stage_duration_seconds",
            "Wall-clock duration of a single stage execution",
        ))?;
        registry.register(Box::new(stage_duration_seconds.clone()))?;

        let stage_cost_usd = Histogram::with_opts(HistogramOpts::new(
            "media_pipeline_stage_cost_usd",
            "USD cost reported by a single stage execution",
        ))?;
        registry.register(Box::new(stage_cost_usd.clone()))?;

        let cache_lookups = IntCounterVec::new(
            Opts::new("media_pipeline_cache_lookups_total", "Cache lookups by cache name and outcome"),
            &["cache", "outcome"],
        )?;
        registry.register(Box::new(cache_lookups.clone()))?;

        let stage_outcomes = IntCounterVec::new(
            Opts::new("media_pipeline_stage_outcomes_total", "Stage executions by stage name and outcome"),
            &["stage", "outcome"],
        )?;
        registry.register(Box::new(stage_outcomes.clone()))?;

        Ok(Self {
            registry,
            stage_duration_seconds,
            stage_cost_usd,
            cache_lookups,
            stage_outcomes,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn observe_stage_duration(&self, seconds: f64) {
        self.stage_duration_seconds.observe(seconds);
    }

    pub fn observe_stage_cost(&self, usd: f64) {
        self.stage_cost_usd.observe(usd);
    }

    pub fn record_cache_lookup(&self, cache: &str, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.cache_lookups.with_label_values(&[cache, outcome]).inc();
    }

    pub fn record_stage_outcome(&self, stage: &str, outcome: &str) {
        self.stage_outcomes.with_label_values(&[stage, outcome]).inc();
    }

    /// Renders the current metric set in Prometheus text exposition
    /// format, for the HTTP `/metrics` endpoint.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new().expect("metric registration with fixed, non-duplicate names never fails")
    }
}

/// Lightweight HTTP server exposing `/metrics` (Prometheus text format) and
/// `/health` on localhost. Runs for the lifetime of the process; `main`
/// spawns it as a background task and doesn't await it.
pub struct MetricsEndpoint {
    metrics: std::sync::Arc<MetricsService>,
    port: u16,
}

impl MetricsEndpoint {
    pub fn new(metrics: std::sync::Arc<MetricsService>, port: u16) -> Self {
        Self { metrics, port }
    }

    pub async fn start(&self) -> std::io::Result<()> {
        use tokio::net::TcpListener;

        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("metrics endpoint listening on http://{addr}/metrics");

        loop {
            let (stream, _) = listener.accept().await?;
            let metrics = self.metrics.clone();
            tokio::spawn(async move {
                if let Err(error) = handle_request(stream, metrics).await {
                    tracing::warn!(%error, "error serving metrics request");
                }
            });
        }
    }
}

async fn handle_request(mut stream: tokio::net::TcpStream, metrics: std::sync::Arc<MetricsService>) -> std::io::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut buffer = [0u8; 1024];
    let n = stream.read(&mut buffer).await?;
    let request = String::from_utf8_lossy(&buffer[..n]);
    let request_line = request.lines().next().unwrap_or("");

    let response = if request_line.starts_with("GET /metrics") {
        match metrics.render() {
            Ok(body) => format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            ),
            Err(error) => {
                let body = format!("error rendering metrics: {error}");
                format!("HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\n\r\n{}", body.len(), body)
            }
        }
    } else if request_line.starts_with("GET /health") {
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK".to_string()
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nNot Found".to_string()
    };

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        let metrics = MetricsService::new().unwrap();
        metrics.observe_stage_duration(1.5);
        metrics.record_cache_lookup("baseline", true);
        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("media_pipeline_stage_duration_seconds"));
        assert!(rendered.contains("media_pipeline_cache_lookups_total"));
    }
}
