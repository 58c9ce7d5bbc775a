use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Entry;

/// 缓存条目：成功的列取结果，或永久性的不可访问标记
#[derive(Debug, Clone)]
pub enum CachedListing {
    Listed(Arc<Vec<Entry>>),
    Inaccessible,
}

/// 单次运行内的目录列取缓存
///
/// 同一路径在一次运行中最多列取一次，失败结果同样缓存，
/// 不会对无法访问的目录反复重试。
#[derive(Debug, Default)]
pub struct DirectoryCache {
    entries: HashMap<String, CachedListing>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &str) -> Option<CachedListing> {
        self.entries.get(path).cloned()
    }

    pub fn store_listing(&mut self, path: &str, listing: Arc<Vec<Entry>>) {
        self.entries.insert(path.to_string(), CachedListing::Listed(listing));
    }

    pub fn store_inaccessible(&mut self, path: &str) {
        self.entries
            .insert(path.to_string(), CachedListing::Inaccessible);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
