//! Flow run reporting.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct FlowRecord {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub detail: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub flows: Vec<FlowRecord>,
}

impl Default for FlowReport {
    fn default() -> Self {
        Self {
            started_at: chrono::Utc::now(),
            total: 0,
            passed: 0,
            failed: 0,
            duration_ms: 0,
            flows: Vec::new(),
        }
    }
}

impl FlowReport {
    pub fn record(&mut self, record: FlowRecord) {
        self.total += 1;
        if record.success {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.flows.push(record);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as pretty JSON under `dir`.
    pub fn write_json(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("flow-report.json");
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("report written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_records() {
        let mut report = FlowReport::default();
        report.record(FlowRecord {
            name: "login".into(),
            success: true,
            duration_ms: 10,
            detail: None,
            error: None,
        });
        report.record(FlowRecord {
            name: "purchase".into(),
            success: false,
            duration_ms: 20,
            detail: None,
            error: Some("boom".into()),
        });

        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());
    }
}
