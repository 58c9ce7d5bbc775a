use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 单个目录的估算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// 正常抽样估算
    Sampled,
    /// 与先前某个目录指纹相同，被跳过
    PatternMatch,
    /// 同构兄弟目录，复用代表目录的结果
    PatternReuse,
    /// 目录无法列取
    Inaccessible,
    /// 超出最大递归深度
    DepthLimit,
    /// 用户中断，未及处理
    Cancelled,
}

impl EstimationMethod {
    /// 报告中使用的标签
    pub fn label(&self) -> &'static str {
        match self {
            EstimationMethod::Sampled => "sampled",
            EstimationMethod::PatternMatch => "pattern_match",
            EstimationMethod::PatternReuse => "pattern_reuse",
            EstimationMethod::Inaccessible => "inaccessible",
            EstimationMethod::DepthLimit => "depth_limit",
            EstimationMethod::Cancelled => "cancelled",
        }
    }
}

/// 抽样细节，仅抽样估算的节点携带
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDetail {
    /// 实际抽取的文件数
    pub files_sampled: u64,
    /// 目录中的文件总数
    pub total_files: u64,
    /// 样本平均大小（字节）
    pub average_size: f64,
    /// 被抽中的文件名（文件类型分布统计用）
    pub sampled_names: Vec<String>,
    /// 被抽中文件的大小
    pub sampled_sizes: Vec<u64>,
    /// 样本中特权格式文件的数量
    pub privileged_sampled: u64,
}

/// 估算结果树的一个节点
///
/// 每个节点对应远程层级中的一个目录。统计字段为整棵子树的
/// 累计值：子目录的贡献在递归返回时已经汇入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationNode {
    /// 相对根目录的路径，如 "./dac/aoml"
    pub path: String,
    /// 估算大小（字节，含整棵子树）
    pub estimated_size: u64,
    /// 估算文件数（含整棵子树）
    pub file_count: u64,
    /// 子目录数（含整棵子树）
    pub dir_count: u64,
    /// 实际抽样的文件数（含整棵子树）
    pub files_sampled: u64,
    /// 目录是否可访问
    pub accessible: bool,
    /// 本目录的估算方式
    pub method: EstimationMethod,
    /// 指纹匹配或结构复用的来源
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub similar_to: Option<String>,
    /// 本目录自身的抽样细节
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sample: Option<SampleDetail>,
    /// 已递归的子目录，键为子目录名称
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub subdirectories: BTreeMap<String, EstimationNode>,
}

impl EstimationNode {
    fn leaf(path: String, method: EstimationMethod, accessible: bool) -> Self {
        Self {
            path,
            estimated_size: 0,
            file_count: 0,
            dir_count: 0,
            files_sampled: 0,
            accessible,
            method,
            similar_to: None,
            sample: None,
            subdirectories: BTreeMap::new(),
        }
    }

    /// 正常抽样节点，统计字段由调用方填充
    pub fn sampled(path: String) -> Self {
        Self::leaf(path, EstimationMethod::Sampled, true)
    }

    /// 超出深度上限的占位节点，不贡献任何统计
    ///
    /// 目录本身从未被列取，accessible 统一置 false。
    pub fn depth_limited(path: String) -> Self {
        Self::leaf(path, EstimationMethod::DepthLimit, false)
    }

    /// 不可访问目录的占位节点
    pub fn inaccessible(path: String) -> Self {
        Self::leaf(path, EstimationMethod::Inaccessible, false)
    }

    /// 中断时的占位节点，不贡献任何统计
    pub fn cancelled(path: String) -> Self {
        Self::leaf(path, EstimationMethod::Cancelled, false)
    }

    /// 指纹与已见目录相同而被跳过的节点，不贡献任何统计
    pub fn pattern_match(path: String, similar_to: String) -> Self {
        let mut node = Self::leaf(path, EstimationMethod::PatternMatch, true);
        node.similar_to = Some(similar_to);
        node
    }

    /// 复用代表目录结果的同构兄弟节点
    ///
    /// 统计字段与子树从代表目录整份拷贝，抽样计数不重复计入。
    pub fn reuse_of(path: String, representative_name: &str, representative: &EstimationNode) -> Self {
        Self {
            path,
            estimated_size: representative.estimated_size,
            file_count: representative.file_count,
            dir_count: representative.dir_count,
            files_sampled: 0,
            accessible: true,
            method: EstimationMethod::PatternReuse,
            similar_to: Some(representative_name.to_string()),
            sample: None,
            subdirectories: representative.subdirectories.clone(),
        }
    }

    /// 将一个子目录节点挂入本节点，并把它的累计统计汇入
    pub fn absorb_child(&mut self, name: String, child: EstimationNode) {
        self.estimated_size += child.estimated_size;
        self.file_count += child.file_count;
        self.dir_count += child.dir_count;
        self.files_sampled += child.files_sampled;
        self.subdirectories.insert(name, child);
    }

    /// 子树相对本节点的最大深度（叶节点为 0）
    pub fn depth(&self) -> u64 {
        self.subdirectories
            .values()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// 统计子树中各估算方式的节点数量
    pub fn method_counts(&self) -> BTreeMap<&'static str, u64> {
        let mut counts = BTreeMap::new();
        self.collect_methods(&mut counts);
        counts
    }

    fn collect_methods(&self, counts: &mut BTreeMap<&'static str, u64>) {
        *counts.entry(self.method.label()).or_insert(0) += 1;
        for child in self.subdirectories.values() {
            child.collect_methods(counts);
        }
    }
}
