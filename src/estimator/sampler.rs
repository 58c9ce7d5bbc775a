use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::estimator::signature::PrivilegedFormats;
use crate::models::Entry;

/// 依据样本推算出的目录级数字
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleEstimate {
    /// 推算的目录总字节数
    pub estimated_size: u64,
    /// 样本平均大小
    pub average_size: f64,
}

/// 在抽样预算内挑选文件样本
///
/// 特权格式文件优先进入样本，剩余预算从其他文件中均匀
/// 随机补齐。文件总数不超过预算时全量返回。
pub fn select_sample<'a>(
    files: &[&'a Entry],
    sample_size: usize,
    privileged: &PrivilegedFormats,
    rng: &mut StdRng,
) -> Vec<&'a Entry> {
    if files.len() <= sample_size {
        return files.to_vec();
    }

    let privileged_files: Vec<&'a Entry> = files
        .iter()
        .copied()
        .filter(|f| privileged.contains(f))
        .collect();
    let other_files: Vec<&'a Entry> = files
        .iter()
        .copied()
        .filter(|f| !privileged.contains(f))
        .collect();

    let mut sample: Vec<&'a Entry> = privileged_files.into_iter().take(sample_size).collect();
    let remaining = sample_size - sample.len();
    if remaining > 0 {
        if other_files.len() > remaining {
            sample.extend(other_files.choose_multiple(rng, remaining).copied());
        } else {
            sample.extend(other_files);
        }
    }
    sample
}

/// 由样本推算整个目录的字节数
///
/// 样本覆盖全部文件时直接精确求和，否则用样本均值乘以
/// 文件总数。
pub fn extrapolate(sample: &[&Entry], total_files: u64) -> SampleEstimate {
    let sum: u64 = sample.iter().map(|f| f.size).sum();
    let average_size = sum as f64 / sample.len() as f64;
    let estimated_size = if sample.len() as u64 >= total_files {
        sum
    } else {
        (average_size * total_files as f64) as u64
    };
    SampleEstimate {
        estimated_size,
        average_size,
    }
}
