use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::estimator::cache::{CachedListing, DirectoryCache};
use crate::estimator::engine::EstimateOptions;
use crate::estimator::memo::PatternMemo;
use crate::metadata::{FeatureCollector, TemporalCollector};
use crate::models::{Entry, RunCounters};
use crate::provider::{join_path, ListingProvider, ProviderError};

/// 递归过程中的一次进度通知
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// 正在处理的目录
    pub current_path: String,
    /// 当前计数器快照
    pub counters: RunCounters,
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// 贯穿整个递归的运行状态
///
/// 缓存、指纹注册表、计数器、元数据收集器与随机源都集中
/// 在这里，作为可变引用沿递归传递，不依赖任何全局量。
pub struct EstimationContext {
    pub cache: DirectoryCache,
    pub memo: PatternMemo,
    pub accessible: BTreeSet<String>,
    pub inaccessible: BTreeSet<String>,
    pub counters: RunCounters,
    pub temporal: TemporalCollector,
    pub features: FeatureCollector,
    pub rng: StdRng,
    pub cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl EstimationContext {
    pub fn new(
        options: &EstimateOptions,
        cancel: CancellationToken,
        progress: Option<ProgressFn>,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cache: DirectoryCache::new(),
            memo: PatternMemo::new(),
            accessible: BTreeSet::new(),
            inaccessible: BTreeSet::new(),
            counters: RunCounters::default(),
            temporal: TemporalCollector::new(),
            features: FeatureCollector::new(options.vocabulary.clone()),
            rng,
            cancel,
            progress,
        }
    }

    /// 取目录列表，优先命中缓存
    ///
    /// 真实拉取时完成错误分类、计数与元数据扫描。失败的目录
    /// 同样记入缓存，整次运行内不会重试。返回 None 表示目录
    /// 不可访问。
    pub async fn fetch_listing<P: ListingProvider>(
        &mut self,
        provider: &mut P,
        path: &str,
    ) -> Option<Arc<Vec<Entry>>> {
        if let Some(cached) = self.cache.lookup(path) {
            return match cached {
                CachedListing::Listed(listing) => Some(listing),
                CachedListing::Inaccessible => None,
            };
        }

        tracing::info!("扫描目录: {}", path);
        let result = match provider.list(path).await {
            Ok(entries) => {
                self.counters.directories_scanned += 1;
                self.accessible.insert(path.to_string());
                for entry in entries.iter().filter(|e| e.is_file()) {
                    let full_path = join_path(path, &entry.name);
                    self.temporal.observe(&full_path);
                    self.features.observe(&full_path);
                }
                let listing = Arc::new(entries);
                self.cache.store_listing(path, Arc::clone(&listing));
                Some(listing)
            }
            Err(err) => {
                match &err {
                    ProviderError::PermissionDenied { .. } => {
                        tracing::warn!("目录拒绝访问: {}", path)
                    }
                    other => tracing::warn!("列取目录失败: {}", other),
                }
                self.inaccessible.insert(path.to_string());
                self.cache.store_inaccessible(path);
                None
            }
        };

        if let Some(callback) = &self.progress {
            callback(ProgressUpdate {
                current_path: path.to_string(),
                counters: self.counters,
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn context() -> EstimationContext {
        EstimationContext::new(
            &EstimateOptions::default(),
            CancellationToken::new(),
            None,
        )
    }

    #[tokio::test]
    async fn test_fetch_listing_caches_result() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./dac");
        provider.add_file("./dac", "d2023_prof.nc", 100);

        let mut ctx = context();
        let first = ctx.fetch_listing(&mut provider, "./dac").await.unwrap();
        let second = ctx.fetch_listing(&mut provider, "./dac").await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        // 第二次命中缓存，不再触发真实列取
        assert_eq!(provider.calls_for("./dac"), 1);
        assert_eq!(ctx.counters.directories_scanned, 1);
    }

    #[tokio::test]
    async fn test_denied_directory_cached_as_inaccessible() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./secret");
        provider.deny("./secret");

        let mut ctx = context();
        assert!(ctx.fetch_listing(&mut provider, "./secret").await.is_none());
        assert!(ctx.fetch_listing(&mut provider, "./secret").await.is_none());

        assert_eq!(provider.calls_for("./secret"), 1);
        assert!(ctx.inaccessible.contains("./secret"));
        assert_eq!(ctx.counters.directories_scanned, 0);
    }

    #[tokio::test]
    async fn test_metadata_collected_at_fetch_time() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./dac");
        provider.add_file("./dac", "temp_20230401_prof.nc", 100);

        let mut ctx = context();
        ctx.fetch_listing(&mut provider, "./dac").await.unwrap();

        assert!(!ctx.temporal.range().is_empty());
        assert!(ctx.features.set().parameters.contains("temp"));
    }
}
