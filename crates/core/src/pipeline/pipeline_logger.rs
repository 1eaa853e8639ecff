use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for pipeline runs.
///
/// The pipeline reports stage durations and counts here; what happens to
/// them (discarded, aggregated for a summary, shown in a UI) is up to the
/// caller.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took in one run.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-run count such as faces or landmarks found.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates stage timings and counts across runs and prints a table on
/// [`PipelineLogger::summary`].
pub struct StdoutPipelineLogger {
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    messages: Vec<String>,
    started: Instant,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            messages: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Number of runs that reached the given stage.
    pub fn runs_for(&self, stage: &str) -> usize {
        self.timings.get(stage).map_or(0, Vec::len)
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let runs = self.timings.values().map(Vec::len).max().unwrap_or(0);
        let mut lines = vec![format!(
            "Annotation summary ({runs} run(s), {:.2}s wall):",
            self.started.elapsed().as_secs_f64()
        )];

        for (stage, durations) in &self.timings {
            let total: f64 = durations.iter().sum();
            let avg = mean(durations);
            let max = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:8}: avg {avg:7.1}ms  max {max:7.1}ms  total {total:8.1}ms"
            ));
        }

        for (name, values) in &self.metrics {
            let total: f64 = values.iter().sum();
            lines.push(format!("  {name}: total {total:.0}, avg {:.1}", mean(values)));
        }

        Some(lines.join("\n"))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_string());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            println!("{text}");
        }
    }
}
