use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::DefaultConfig;
use crate::models::Entry;

/// 特权文件格式集合
///
/// 含这些扩展名的文件是估算的核心对象，含特权文件的目录
/// 永远不会因指纹重复被跳过。
#[derive(Debug, Clone)]
pub struct PrivilegedFormats {
    extensions: HashSet<String>,
}

impl PrivilegedFormats {
    /// 由扩展名集合构建，统一转为小写并补上前导点
    pub fn new<I>(extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.into().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self { extensions }
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        let ext = entry.extension();
        !ext.is_empty() && self.extensions.contains(&ext)
    }

    /// 目录条目中特权文件的数量
    pub fn count_in(&self, entries: &[Entry]) -> u64 {
        entries
            .iter()
            .filter(|e| e.is_file() && self.contains(e))
            .count() as u64
    }
}

impl Default for PrivilegedFormats {
    fn default() -> Self {
        Self::new(DefaultConfig::privileged_extensions())
    }
}

/// 目录结构指纹
///
/// 由条目数量与扩展名分布构成，用来识别结构完全相同的
/// 目录。大小不参与指纹，只看结构。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSignature {
    /// 文件数
    pub file_count: u64,
    /// 子目录数
    pub dir_count: u64,
    /// 扩展名占比，按扩展名排序
    pub extensions: Vec<(String, f64)>,
    /// 是否含子目录
    pub has_subdirs: bool,
    /// 是否含特权格式文件
    pub has_privileged: bool,
    /// 特权格式文件数
    pub privileged_count: u64,
}

impl PatternSignature {
    /// 计算目录指纹；空目录返回 None，不参与指纹去重
    pub fn compute(entries: &[Entry], privileged: &PrivilegedFormats) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let mut file_count: u64 = 0;
        let mut dir_count: u64 = 0;
        let mut histogram: HashMap<String, u64> = HashMap::new();
        for entry in entries {
            if entry.is_dir() {
                dir_count += 1;
            } else {
                file_count += 1;
                *histogram.entry(entry.extension()).or_insert(0) += 1;
            }
        }

        let mut extensions: Vec<(String, f64)> = histogram
            .into_iter()
            .map(|(ext, count)| (ext, count as f64 / file_count as f64))
            .collect();
        extensions.sort_by(|a, b| a.0.cmp(&b.0));

        let privileged_count = privileged.count_in(entries);
        Some(Self {
            file_count,
            dir_count,
            extensions,
            has_subdirs: dir_count > 0,
            has_privileged: privileged_count > 0,
            privileged_count,
        })
    }

    /// 指纹相等判定
    ///
    /// 任何一方含特权文件都不算相同，保证特权数据永远逐个
    /// 目录处理。
    pub fn matches(&self, other: &Self) -> bool {
        if self.has_privileged || other.has_privileged {
            return false;
        }
        self.file_count == other.file_count
            && self.dir_count == other.dir_count
            && self.has_subdirs == other.has_subdirs
            && self.extensions == other.extensions
    }
}
