use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metadata::{FeatureSet, TemporalRange};
use crate::models::{Entry, EstimationNode};

/// 一次运行的全局计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// 实际列取成功的目录数
    pub directories_scanned: u64,
    /// 实际抽样的文件总数
    pub files_sampled_total: u64,
    /// 因指纹重复被跳过的目录数
    pub pattern_matches_skipped: u64,
}

/// 一次完整估算的输出
#[derive(Debug, Clone, Serialize)]
pub struct EstimateOutcome {
    /// 目标描述，如 "ftp.ifremer.fr/ifremer/argo"
    pub target: String,
    /// 估算树的根节点
    pub root: EstimationNode,
    /// 文件名中提取到的时间覆盖范围
    pub temporal: TemporalRange,
    /// 命中的数据特征关键词
    pub features: FeatureSet,
    /// 全局计数器
    pub counters: RunCounters,
    /// 无法访问的目录路径（排序后）
    pub inaccessible_paths: Vec<String>,
    /// 注册表中的唯一指纹数
    pub unique_patterns: u64,
    /// 运行耗时
    pub duration: Duration,
    /// 是否被用户中断
    pub interrupted: bool,
}

/// 快速扫描得到的顶层概览
#[derive(Debug, Clone, Serialize)]
pub struct TopLevelOverview {
    /// 顶层路径
    pub path: String,
    /// 顶层子目录名称
    pub directories: Vec<String>,
    /// 顶层文件条目
    pub files: Vec<Entry>,
    /// 顶层文件名中提取到的时间覆盖范围
    pub temporal: TemporalRange,
    /// 顶层文件名中命中的数据特征
    pub features: FeatureSet,
    /// 顶层目录是否可访问
    pub accessible: bool,
}
