pub mod summary;
pub mod text;

pub use summary::{DetailedStats, RunSummary};
pub use text::{render_text_report, write_text_report};

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::models::EstimateOutcome;

/// 机器可读报告：汇总、统计与完整估算树
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub summary: &'a RunSummary,
    pub statistics: &'a DetailedStats,
    pub outcome: &'a EstimateOutcome,
}

/// 把完整结果写成 JSON 报告
pub fn write_json_report(
    path: &Path,
    outcome: &EstimateOutcome,
    summary: &RunSummary,
    stats: &DetailedStats,
) -> Result<()> {
    let report = JsonReport {
        summary,
        statistics: stats,
        outcome,
    };
    let content = serde_json::to_string_pretty(&report)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!("JSON 报告已写入: {}", path.display());
    Ok(())
}
