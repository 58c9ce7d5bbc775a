use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{EstimateOutcome, EstimationNode};
use crate::utils::format_size;

/// 报告首部的汇总指标
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub target: String,
    pub estimated_size: u64,
    pub estimated_size_readable: String,
    pub estimated_files: u64,
    pub estimated_directories: u64,
    pub duration_secs: f64,
    pub directories_scanned: u64,
    pub files_sampled_total: u64,
    pub pattern_matches_skipped: u64,
    pub unique_patterns: u64,
    pub inaccessible_directories: u64,
    /// 抽样文件数占估算文件总数的百分比
    pub sampling_coverage_percent: f64,
    pub directories_per_second: f64,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn from_outcome(outcome: &EstimateOutcome) -> Self {
        let duration_secs = outcome.duration.as_secs_f64();
        let estimated_files = outcome.root.file_count;
        let sampling_coverage_percent = if estimated_files > 0 {
            (outcome.counters.files_sampled_total as f64 / estimated_files as f64 * 100.0)
                .min(100.0)
        } else {
            0.0
        };
        let directories_per_second = if duration_secs > 0.0 {
            outcome.counters.directories_scanned as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            target: outcome.target.clone(),
            estimated_size: outcome.root.estimated_size,
            estimated_size_readable: format_size(outcome.root.estimated_size),
            estimated_files,
            estimated_directories: outcome.root.dir_count,
            duration_secs,
            directories_scanned: outcome.counters.directories_scanned,
            files_sampled_total: outcome.counters.files_sampled_total,
            pattern_matches_skipped: outcome.counters.pattern_matches_skipped,
            unique_patterns: outcome.unique_patterns,
            inaccessible_directories: outcome.inaccessible_paths.len() as u64,
            sampling_coverage_percent,
            directories_per_second,
            interrupted: outcome.interrupted,
        }
    }
}

/// 文件构成与目录结构的细粒度统计
///
/// 文件类型分布由各节点的样本放大得到，再按根节点的文件
/// 总数整体校准，是推算值而不是精确计数。
#[derive(Debug, Clone, Serialize)]
pub struct DetailedStats {
    /// 扩展名 -> 推算文件数
    pub file_type_breakdown: BTreeMap<String, u64>,
    /// 数据类别 -> 推算文件数，按展示顺序排列
    pub data_categories: Vec<(String, u64)>,
    pub unique_extensions: u64,
    pub maximum_depth: u64,
    pub average_files_per_directory: f64,
    /// 各估算方式的节点数
    pub method_counts: BTreeMap<String, u64>,
}

impl DetailedStats {
    pub fn from_outcome(outcome: &EstimateOutcome) -> Self {
        let mut breakdown: BTreeMap<String, u64> = BTreeMap::new();
        collect_file_types(&outcome.root, &mut breakdown);

        // 按根节点文件总数整体校准
        let counted: u64 = breakdown.values().sum();
        let total = outcome.root.file_count;
        if counted > 0 && total > 0 && counted != total {
            let factor = total as f64 / counted as f64;
            for value in breakdown.values_mut() {
                *value = (*value as f64 * factor) as u64;
            }
        }

        let data_categories = categorize(&breakdown);
        let unique_extensions = breakdown.len() as u64;
        let directories = outcome.root.dir_count;
        let average_files_per_directory = if directories > 0 {
            total as f64 / directories as f64
        } else {
            total as f64
        };
        let method_counts = outcome
            .root
            .method_counts()
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();

        Self {
            file_type_breakdown: breakdown,
            data_categories,
            unique_extensions,
            maximum_depth: outcome.root.depth(),
            average_files_per_directory,
            method_counts,
        }
    }
}

/// 以节点样本为基准，把扩展名计数放大到节点的文件总数
fn collect_file_types(node: &EstimationNode, breakdown: &mut BTreeMap<String, u64>) {
    if let Some(sample) = &node.sample {
        let mut local: BTreeMap<String, u64> = BTreeMap::new();
        for name in &sample.sampled_names {
            *local.entry(extension_of(name)).or_insert(0) += 1;
        }
        let factor = if sample.files_sampled > 0 && sample.total_files > sample.files_sampled {
            sample.total_files as f64 / sample.files_sampled as f64
        } else {
            1.0
        };
        for (ext, count) in local {
            *breakdown.entry(ext).or_insert(0) += (count as f64 * factor) as u64;
        }
    }
    for child in node.subdirectories.values() {
        collect_file_types(child, breakdown);
    }
}

fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].to_lowercase(),
        _ => "no_extension".to_string(),
    }
}

fn categorize(breakdown: &BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let categories: [(&str, &[&str]); 4] = [
        ("NetCDF 数据文件", &[".nc", ".nc4", ".cdf"]),
        ("文本与索引文件", &[".txt", ".csv", ".dat", ".asc"]),
        ("压缩文件", &[".gz", ".zip", ".tar", ".bz2"]),
        ("元数据文件", &[".xml", ".json", ".yml", ".yaml"]),
    ];

    let mut result = Vec::new();
    let mut categorized: u64 = 0;
    for (label, extensions) in categories {
        let count: u64 = extensions
            .iter()
            .filter_map(|ext| breakdown.get(*ext))
            .sum();
        categorized += count;
        result.push((label.to_string(), count));
    }
    let total: u64 = breakdown.values().sum();
    result.push(("其他".to_string(), total.saturating_sub(categorized)));
    result
}
