use prometheus::{IntCounterVec, Opts, Registry};

use crate::pipeline::Direction;

pub struct Metrics {
    pub runs: IntCounterVec,
    pub failures: IntCounterVec,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let runs = IntCounterVec::new(
            Opts::new("layer_runs_total", "Pipeline runs by direction"),
            &["direction"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("layer_failures_total", "Failed pipeline runs by direction"),
            &["direction"],
        )?;
        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        Ok(Self { runs, failures })
    }

    pub fn record<T, E>(&self, direction: Direction, result: &Result<T, E>) {
        self.runs.with_label_values(&[direction.as_str()]).inc();
        if result.is_err() {
            self.failures.with_label_values(&[direction.as_str()]).inc();
        }
    }
}
