use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

/// 文件名中提取到的时间覆盖范围
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemporalRange {
    /// 最早日期
    pub min_date: Option<NaiveDate>,
    /// 最晚日期
    pub max_date: Option<NaiveDate>,
    /// 命中过的日期模式标签
    pub patterns_matched: BTreeSet<String>,
}

impl TemporalRange {
    pub fn is_empty(&self) -> bool {
        self.min_date.is_none()
    }

    fn widen(&mut self, date: NaiveDate) {
        match self.min_date {
            Some(min) if min <= date => {}
            _ => self.min_date = Some(date),
        }
        match self.max_date {
            Some(max) if max >= date => {}
            _ => self.max_date = Some(date),
        }
    }
}

/// 从路径与文件名中识别日期的收集器
///
/// 模式按精确度从高到低排列，同一个文件名只取第一个命中
/// 且日期合法的模式。最早日期与最晚日期单调扩张，处理顺序
/// 不影响结果。
pub struct TemporalCollector {
    patterns: Vec<(&'static str, Regex)>,
    range: TemporalRange,
}

impl TemporalCollector {
    pub fn new() -> Self {
        // Regex::new 对这些字面模式不会失败
        let patterns = vec![
            ("YYYYMMDD", r"(\d{4})(\d{2})(\d{2})"),
            ("YYYY-MM-DD", r"(\d{4})-(\d{2})-(\d{2})"),
            ("YYYY_MM_DD", r"(\d{4})_(\d{2})_(\d{2})"),
            ("YYYYMM", r"(\d{4})(\d{2})"),
        ]
        .into_iter()
        .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|re| (label, re)))
        .collect();

        Self {
            patterns,
            range: TemporalRange::default(),
        }
    }

    /// 扫描一个完整路径，更新时间范围
    pub fn observe(&mut self, path: &str) {
        let lowered = path.to_lowercase();
        for (label, re) in &self.patterns {
            let mut hit = false;
            for caps in re.captures_iter(&lowered) {
                if let Some(date) = capture_to_date(&caps) {
                    self.range.widen(date);
                    self.range.patterns_matched.insert((*label).to_string());
                    hit = true;
                }
            }
            // 首个产生合法日期的模式生效，不再尝试更宽松的模式
            if hit {
                return;
            }
        }
    }

    pub fn range(&self) -> &TemporalRange {
        &self.range
    }

    pub fn into_range(self) -> TemporalRange {
        self.range
    }
}

impl Default for TemporalCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_to_date(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = match caps.get(3) {
        Some(day) => day.as_str().parse().ok()?,
        // YYYYMM 模式当作当月第一天
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
