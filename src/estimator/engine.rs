use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::estimator::context::{EstimationContext, ProgressFn, ProgressUpdate};
use crate::estimator::grouper::SiblingGrouper;
use crate::estimator::sampler::{extrapolate, select_sample};
use crate::estimator::signature::{PatternSignature, PrivilegedFormats};
use crate::metadata::FeatureVocabulary;
use crate::models::{EstimateOutcome, EstimationNode, Entry, SampleDetail, TopLevelOverview};
use crate::provider::{join_path, ListingProvider, ProviderResult, ROOT_PATH};

/// 估算参数
#[derive(Debug, Clone)]
pub struct EstimateOptions {
    /// 最大递归深度，根目录计为第 1 层
    pub max_depth: u32,
    /// 每个目录的抽样文件数上限
    pub sample_size: usize,
    /// 随机数种子，None 表示每次运行随机
    pub seed: Option<u64>,
    /// 特权文件格式
    pub privileged: PrivilegedFormats,
    /// 特征关键词词表
    pub vocabulary: FeatureVocabulary,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            sample_size: 3,
            seed: None,
            privileged: PrivilegedFormats::default(),
            vocabulary: FeatureVocabulary::default(),
        }
    }
}

impl EstimateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.scan.max_depth,
            sample_size: config.scan.sample_size,
            seed: config.scan.seed,
            privileged: PrivilegedFormats::new(config.scan.privileged_extensions.iter().cloned()),
            vocabulary: config.vocabulary.clone(),
        }
    }
}

/// 核心编排器
///
/// 对任意 ListingProvider 做深度受限的递归估算。目录级
/// 失败不会向上冒泡，全部折叠为对应节点的状态。
pub struct Estimator<P> {
    provider: P,
    options: EstimateOptions,
    grouper: SiblingGrouper,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl<P: ListingProvider> Estimator<P> {
    pub fn new(provider: P, options: EstimateOptions) -> Self {
        Self {
            provider,
            options,
            grouper: SiblingGrouper::new(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// 使用外部取消令牌，Ctrl-C 处理由调用方接入
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 注册进度回调，每完成一次真实列取调用一次
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn describe(&self) -> String {
        self.provider.describe()
    }

    pub async fn connect(&mut self) -> ProviderResult<()> {
        self.provider.connect().await
    }

    pub async fn disconnect(&mut self) {
        self.provider.disconnect().await;
    }

    /// 完整估算：从镜像根开始的深度受限递归
    ///
    /// 中断时返回已完成的部分结果，interrupted 置位。
    pub async fn run(&mut self) -> EstimateOutcome {
        let started = Instant::now();
        tracing::info!("开始估算: {}", self.provider.describe());

        let mut ctx =
            EstimationContext::new(&self.options, self.cancel.clone(), self.progress.clone());
        let root = self
            .estimate_directory(&mut ctx, ROOT_PATH.to_string(), 1)
            .await;

        let interrupted = self.cancel.is_cancelled();
        if interrupted {
            tracing::warn!("估算被中断，返回已完成的部分结果");
        }
        tracing::info!(
            "估算完成: 列取 {} 个目录, 抽样 {} 个文件, 跳过 {} 个重复结构",
            ctx.counters.directories_scanned,
            ctx.counters.files_sampled_total,
            ctx.counters.pattern_matches_skipped
        );

        let unique_patterns = ctx.memo.len() as u64;
        EstimateOutcome {
            target: self.provider.describe(),
            root,
            temporal: ctx.temporal.into_range(),
            features: ctx.features.into_set(),
            counters: ctx.counters,
            inaccessible_paths: ctx.inaccessible.into_iter().collect(),
            unique_patterns,
            duration: started.elapsed(),
            interrupted,
        }
    }

    /// 快速扫描：只列取顶层结构并做元数据提取
    pub async fn quick_overview(&mut self) -> TopLevelOverview {
        let mut ctx =
            EstimationContext::new(&self.options, self.cancel.clone(), self.progress.clone());
        match ctx.fetch_listing(&mut self.provider, ROOT_PATH).await {
            Some(listing) => {
                let directories: Vec<String> = listing
                    .iter()
                    .filter(|e| e.is_dir())
                    .map(|e| e.name.clone())
                    .collect();
                let files: Vec<Entry> = listing.iter().filter(|e| e.is_file()).cloned().collect();
                tracing::info!("顶层结构: {} 个目录, {} 个文件", directories.len(), files.len());
                TopLevelOverview {
                    path: ROOT_PATH.to_string(),
                    directories,
                    files,
                    temporal: ctx.temporal.into_range(),
                    features: ctx.features.into_set(),
                    accessible: true,
                }
            }
            None => TopLevelOverview {
                path: ROOT_PATH.to_string(),
                directories: Vec::new(),
                files: Vec::new(),
                temporal: ctx.temporal.into_range(),
                features: ctx.features.into_set(),
                accessible: false,
            },
        }
    }

    /// 递归估算单个目录
    ///
    /// 顺序固定：深度检查、取消检查、列取、指纹去重、文件
    /// 抽样、子目录分组递归。
    fn estimate_directory<'a>(
        &'a mut self,
        ctx: &'a mut EstimationContext,
        path: String,
        depth: u32,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = EstimationNode> + Send + 'a>> {
        Box::pin(async move {
            if depth > self.options.max_depth {
                tracing::debug!("达到最大深度 {}: {}", self.options.max_depth, path);
                return EstimationNode::depth_limited(path);
            }
            if ctx.cancel.is_cancelled() {
                return EstimationNode::cancelled(path);
            }

            let listing = match ctx.fetch_listing(&mut self.provider, &path).await {
                Some(listing) => listing,
                None => return EstimationNode::inaccessible(path),
            };

            // 指纹去重：结构与已见目录完全相同时整体跳过
            if let Some(signature) = PatternSignature::compute(&listing, &self.options.privileged) {
                if signature.has_privileged {
                    tracing::debug!(
                        "{} 含 {} 个特权格式文件，逐个处理",
                        path,
                        signature.privileged_count
                    );
                }
                if let Some(matched) = ctx.memo.observe(&path, signature) {
                    ctx.counters.pattern_matches_skipped += 1;
                    tracing::info!("跳过重复结构: {} (与 {} 相同)", path, matched);
                    return EstimationNode::pattern_match(path, matched);
                }
            }

            let mut node = EstimationNode::sampled(path.clone());

            // 文件抽样与外推
            let files: Vec<&Entry> = listing.iter().filter(|e| e.is_file()).collect();
            node.file_count = files.len() as u64;
            if !files.is_empty() {
                let sample = select_sample(
                    &files,
                    self.options.sample_size,
                    &self.options.privileged,
                    &mut ctx.rng,
                );
                let estimate = extrapolate(&sample, files.len() as u64);
                let privileged_sampled = sample
                    .iter()
                    .filter(|f| self.options.privileged.contains(f))
                    .count() as u64;
                node.estimated_size = estimate.estimated_size;
                node.files_sampled = sample.len() as u64;
                ctx.counters.files_sampled_total += sample.len() as u64;
                tracing::debug!(
                    "{}: 抽样 {}/{} 个文件, 估算 {} 字节",
                    path,
                    sample.len(),
                    files.len(),
                    node.estimated_size
                );
                node.sample = Some(SampleDetail {
                    files_sampled: sample.len() as u64,
                    total_files: files.len() as u64,
                    average_size: estimate.average_size,
                    sampled_names: sample.iter().map(|f| f.name.clone()).collect(),
                    sampled_sizes: sample.iter().map(|f| f.size).collect(),
                    privileged_sampled,
                });
            }

            // 子目录：同构兄弟分组，代表完整递归，其余复用结果
            let subdir_names: Vec<&str> = listing
                .iter()
                .filter(|e| e.is_dir())
                .map(|e| e.name.as_str())
                .collect();
            node.dir_count = subdir_names.len() as u64;
            let groups = self.grouper.group(&subdir_names);
            for group in groups {
                if ctx.cancel.is_cancelled() {
                    break;
                }
                if group.members.len() > 1 {
                    tracing::info!(
                        "发现 {} 个同构兄弟目录 (基名 \"{}\"), 只递归 {}",
                        group.members.len(),
                        group.base,
                        group.representative()
                    );
                }
                let representative = group.members[0].clone();
                let rep_path = join_path(&path, &representative);
                let rep_node = self.estimate_directory(ctx, rep_path, depth + 1).await;
                for member in &group.members[1..] {
                    let member_path = join_path(&path, member);
                    let reused = EstimationNode::reuse_of(member_path, &representative, &rep_node);
                    node.absorb_child(member.clone(), reused);
                }
                node.absorb_child(representative, rep_node);
            }

            node
        })
    }
}
