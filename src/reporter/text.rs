use std::fmt::Write as _;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Result;

use crate::config::ReportConfig;
use crate::models::EstimateOutcome;
use crate::reporter::summary::{DetailedStats, RunSummary};
use crate::utils::{format_count, format_duration, format_size, format_time};

const RULE_HEAVY: &str =
    "================================================================================";
const RULE_LIGHT: &str = "----------------------------------------";

/// 渲染完整的文本报告
pub fn render_text_report(
    outcome: &EstimateOutcome,
    summary: &RunSummary,
    stats: &DetailedStats,
    report: &ReportConfig,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE_HEAVY}");
    let _ = writeln!(out, "FTP 镜像数据规模估算报告");
    let _ = writeln!(out, "{RULE_HEAVY}");
    let _ = writeln!(out);

    let _ = writeln!(out, "总体摘要");
    let _ = writeln!(out, "{RULE_LIGHT}");
    let _ = writeln!(out, "分析时间: {}", format_time(SystemTime::now()));
    let _ = writeln!(out, "目标: {}", summary.target);
    let _ = writeln!(out, "估算总大小: {}", summary.estimated_size_readable);
    let _ = writeln!(out, "估算文件数: {}", format_count(summary.estimated_files));
    let _ = writeln!(
        out,
        "估算目录数: {}",
        format_count(summary.estimated_directories)
    );
    let _ = writeln!(out, "分析耗时: {}", format_duration(outcome.duration));
    if summary.interrupted {
        let _ = writeln!(out, "注意: 本次运行被中断，以下为部分结果");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "时间覆盖范围");
    let _ = writeln!(out, "{RULE_LIGHT}");
    match (outcome.temporal.min_date, outcome.temporal.max_date) {
        (Some(min), Some(max)) => {
            let _ = writeln!(out, "最早日期: {}", min.format("%Y-%m-%d"));
            let _ = writeln!(out, "最晚日期: {}", max.format("%Y-%m-%d"));
            let patterns: Vec<&str> = outcome
                .temporal
                .patterns_matched
                .iter()
                .map(|s| s.as_str())
                .collect();
            let _ = writeln!(out, "命中的日期模式: {}", patterns.join(", "));
        }
        _ => {
            let _ = writeln!(out, "文件名中未发现日期信息");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "检测到的数据特征");
    let _ = writeln!(out, "{RULE_LIGHT}");
    if outcome.features.is_empty() {
        let _ = writeln!(out, "未命中任何特征关键词");
    } else {
        let _ = writeln!(out, "观测参数: {}", join_set(&outcome.features.parameters));
        let _ = writeln!(out, "平台类型: {}", join_set(&outcome.features.platforms));
        let _ = writeln!(out, "数据类型: {}", join_set(&outcome.features.data_types));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "扫描统计");
    let _ = writeln!(out, "{RULE_LIGHT}");
    let _ = writeln!(
        out,
        "实际列取目录数: {}",
        format_count(summary.directories_scanned)
    );
    let _ = writeln!(
        out,
        "实际抽样文件数: {}",
        format_count(summary.files_sampled_total)
    );
    let _ = writeln!(
        out,
        "抽样覆盖率: {:.4}%",
        summary.sampling_coverage_percent
    );
    let _ = writeln!(out, "唯一结构指纹数: {}", summary.unique_patterns);
    let _ = writeln!(
        out,
        "跳过的重复结构目录: {}",
        format_count(summary.pattern_matches_skipped)
    );
    let _ = writeln!(
        out,
        "不可访问目录数: {}",
        format_count(summary.inaccessible_directories)
    );
    if !outcome.inaccessible_paths.is_empty() {
        for path in outcome.inaccessible_paths.iter().take(10) {
            let _ = writeln!(out, "  - {path}");
        }
        if outcome.inaccessible_paths.len() > 10 {
            let _ = writeln!(
                out,
                "  ... 以及另外 {} 个",
                outcome.inaccessible_paths.len() - 10
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "文件类型分布 (前 {} 项)", report.top_file_types);
    let _ = writeln!(out, "{RULE_LIGHT}");
    let mut types: Vec<(&String, &u64)> = stats.file_type_breakdown.iter().collect();
    types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let total_typed: u64 = stats.file_type_breakdown.values().sum();
    for (ext, count) in types.into_iter().take(report.top_file_types) {
        let percent = if total_typed > 0 {
            *count as f64 / total_typed as f64 * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "{:<16} {:>12} ({percent:.1}%)", ext, format_count(*count));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "数据类别");
    let _ = writeln!(out, "{RULE_LIGHT}");
    for (label, count) in &stats.data_categories {
        let _ = writeln!(out, "{}: {}", label, format_count(*count));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "目录结构");
    let _ = writeln!(out, "{RULE_LIGHT}");
    let _ = writeln!(out, "最大递归层级: {}", stats.maximum_depth);
    let _ = writeln!(
        out,
        "平均每目录文件数: {:.1}",
        stats.average_files_per_directory
    );
    for (label, count) in &stats.method_counts {
        let _ = writeln!(out, "{label} 节点数: {}", format_count(*count));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "效率指标");
    let _ = writeln!(out, "{RULE_LIGHT}");
    let _ = writeln!(
        out,
        "目录吞吐: {:.1} 个/秒",
        summary.directories_per_second
    );
    let _ = writeln!(
        out,
        "估算数据量/实际列取目录: {}",
        format_size(per_directory_size(summary))
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "方法说明");
    let _ = writeln!(out, "{RULE_LIGHT}");
    let _ = writeln!(out, "1. 每个目录最多抽样固定数量的文件，用样本均值外推目录总量");
    let _ = writeln!(out, "2. NetCDF 等特权格式文件优先进入样本，且不参与结构去重");
    let _ = writeln!(out, "3. 结构指纹相同的目录只完整分析首个，其余整体跳过");
    let _ = writeln!(out, "4. 名称仅数字不同的兄弟目录只递归代表，其余复用其结果");
    let _ = writeln!(out, "5. 递归深度受限，超出上限的子树计为零贡献");
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE_HEAVY}");

    out
}

/// 渲染并写入文本报告
pub fn write_text_report(
    path: &Path,
    outcome: &EstimateOutcome,
    summary: &RunSummary,
    stats: &DetailedStats,
    report: &ReportConfig,
) -> Result<()> {
    let content = render_text_report(outcome, summary, stats, report);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!("文本报告已写入: {}", path.display());
    Ok(())
}

fn join_set(set: &std::collections::BTreeSet<String>) -> String {
    if set.is_empty() {
        "无".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn per_directory_size(summary: &RunSummary) -> u64 {
    if summary.directories_scanned > 0 {
        summary.estimated_size / summary.directories_scanned
    } else {
        0
    }
}
