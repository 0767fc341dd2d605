use std::fs::File;
use std::io::{BufWriter, Write};
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::metrics::{Measure, MetricKey};
use crate::statistics::Statistic;
use crate::task::{MetricClass, Scope};

/// Batch mean of one (scope × class × measure) entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchRecord {
    pub batch: usize,
    pub scope: Scope,
    pub class: MetricClass,
    pub measure: Measure,
    pub value: f64,
}

impl BatchRecord {
    pub fn new(batch: usize, key: MetricKey, value: f64) -> Self {
        Self {
            batch,
            scope: key.scope,
            class: key.class,
            measure: key.measure,
            value,
        }
    }
}

/// Run-level estimate of one (scope × class × measure) entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub scope: Scope,
    pub class: MetricClass,
    pub measure: Measure,
    pub mean: f64,
    pub sdev: f64,
    pub half_width: f64,
    pub batches: usize,
}

impl SummaryRecord {
    pub fn new(key: MetricKey, statistic: Statistic) -> Self {
        Self {
            scope: key.scope,
            class: key.class,
            measure: key.measure,
            mean: statistic.mean,
            sdev: statistic.sdev,
            half_width: statistic.half_width,
            batches: statistic.batches,
        }
    }
}

pub trait MetricsLogger {
    fn log_batch(&mut self, records: &[BatchRecord]);
    fn save_log(&mut self, path: &str) -> Result<()>;
}

pub struct EmptyMetricsLogger {}

impl MetricsLogger for EmptyMetricsLogger {
    fn log_batch(&mut self, _records: &[BatchRecord]) {}

    fn save_log(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }
}

/// Reports the System/Global line of every closed batch through `log`.
pub struct StdoutMetricsLogger {}

impl MetricsLogger for StdoutMetricsLogger {
    fn log_batch(&mut self, records: &[BatchRecord]) {
        for record in records.iter().filter(|r| r.scope == Scope::System && r.class == MetricClass::Global) {
            info!("batch {}: {} {} {} = {:.6}", record.batch, record.scope, record.class, record.measure, record.value);
        }
    }

    fn save_log(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }
}

/// Keeps every batch record and writes them as CSV.
#[derive(Default)]
pub struct FileMetricsLogger {
    history: Vec<BatchRecord>,
}

impl FileMetricsLogger {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn history(&self) -> &[BatchRecord] {
        &self.history
    }
}

impl MetricsLogger for FileMetricsLogger {
    fn log_batch(&mut self, records: &[BatchRecord]) {
        self.history.extend_from_slice(records);
    }

    fn save_log(&mut self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in self.history.iter() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Writes the run summary as JSON.
pub fn save_summary(records: &[SummaryRecord], path: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}
