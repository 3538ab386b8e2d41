//! Report Export - JSONL files per pipeline run
//!
//! One run writes `labels-<run>.jsonl`, `forecasts-<run>.jsonl` (one JSON
//! object per line) and the full `report-<run>.json`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logic::error::AnalyticsResult;
use crate::logic::pipeline::PipelineReport;

/// Default export location: <local data dir>/sensor-insight/exports
pub fn default_export_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensor-insight")
        .join("exports")
}

/// Write one JSON object per line; returns the number of lines
pub fn write_jsonl<'a, T, I>(path: &Path, items: I) -> AnalyticsResult<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out = BufWriter::new(File::create(path)?);
    let mut count = 0;

    for item in items {
        serde_json::to_writer(&mut out, item)?;
        out.write_all(b"\n")?;
        count += 1;
    }

    out.flush()?;
    Ok(count)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub labels_path: PathBuf,
    pub forecasts_path: PathBuf,
    pub report_path: PathBuf,
    pub labels: usize,
    pub forecasts: usize,
}

pub struct ReportWriter {
    base_dir: PathBuf,
}

impl ReportWriter {
    pub fn new() -> AnalyticsResult<Self> {
        Self::from_path(default_export_dir())
    }

    pub fn from_path(base_dir: PathBuf) -> AnalyticsResult<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn export(&self, report: &PipelineReport) -> AnalyticsResult<ExportSummary> {
        let run = report.run_id.simple().to_string();
        let labels_path = self.base_dir.join(format!("labels-{}.jsonl", run));
        let forecasts_path = self.base_dir.join(format!("forecasts-{}.jsonl", run));
        let report_path = self.base_dir.join(format!("report-{}.json", run));

        let labels = write_jsonl(&labels_path, report.anomaly_labels())?;
        let forecasts = write_jsonl(&forecasts_path, report.forecast_points())?;

        let mut out = BufWriter::new(File::create(&report_path)?);
        serde_json::to_writer_pretty(&mut out, report)?;
        out.flush()?;

        log::info!(
            "Exported {} labels and {} forecast points to {}",
            labels,
            forecasts,
            self.base_dir.display()
        );

        Ok(ExportSummary {
            labels_path,
            forecasts_path,
            report_path,
            labels,
            forecasts,
        })
    }

    /// (.jsonl file count, total size in MB, most recently written file name)
    pub fn stats(&self) -> AnalyticsResult<(usize, f32, Option<String>)> {
        let paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "jsonl"))
            .collect();

        let mut size = 0u64;
        let mut files = Vec::with_capacity(paths.len());
        for p in paths {
            let meta = fs::metadata(&p)?;
            size += meta.len();
            files.push((meta.modified()?, p));
        }

        let latest = files
            .iter()
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .and_then(|(_, p)| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from);

        Ok((files.len(), size as f32 / 1024.0 / 1024.0, latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::{AnalyticsConfig, AnomalyConfig};
    use crate::logic::pipeline::AnalyticsPipeline;

    fn report() -> PipelineReport {
        let mut rows = vec![vec![
            "timestamp".to_string(),
            "deviceId".to_string(),
            "tempC".to_string(),
        ]];
        for i in 0..30 {
            rows.push(vec![
                format!("2024-01-01T00:{:02}:00Z", i),
                "esp32".to_string(),
                format!("{}", 20 + i % 4),
            ]);
        }

        let mut config = AnalyticsConfig::quick();
        config.anomaly = AnomalyConfig {
            n_trees: 10,
            ..AnomalyConfig::for_columns(&["tempC"])
        };
        config.forecast.forest.n_trees = 5;
        config.forecast.horizon = 6;
        config.targets = vec!["tempC".to_string()];

        AnalyticsPipeline::new(config).unwrap().run_rows(&rows).unwrap()
    }

    #[test]
    fn test_write_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.jsonl");
        let n = write_jsonl(&path, &[1, 2, 3]).unwrap();

        assert_eq!(n, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n2\n3\n");
    }

    #[test]
    fn test_export_report() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::from_path(dir.path().join("exports")).unwrap();
        let report = report();
        let summary = writer.export(&report).unwrap();

        assert_eq!(summary.labels, 30);
        assert_eq!(summary.forecasts, 6);

        let forecasts = fs::read_to_string(&summary.forecasts_path).unwrap();
        assert_eq!(forecasts.lines().count(), 6);
        let first: serde_json::Value = serde_json::from_str(forecasts.lines().next().unwrap()).unwrap();
        assert_eq!(first["target"], "tempC");
        assert_eq!(first["step"], 1);

        let full: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary.report_path).unwrap()).unwrap();
        assert_eq!(full["record_count"], 30);

        let (count, _, latest) = writer.stats().unwrap();
        assert_eq!(count, 2);
        assert!(latest.is_some());
    }

    #[test]
    fn test_default_export_dir_layout() {
        let dir = default_export_dir();
        assert!(dir.ends_with("sensor-insight/exports"));
    }

    #[test]
    fn test_stats_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::from_path(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (count, size, latest) = writer.stats().unwrap();
        assert_eq!(count, 0);
        assert_eq!(size, 0.0);
        assert!(latest.is_none());
        assert_eq!(writer.base_dir(), dir.path());
    }
}
