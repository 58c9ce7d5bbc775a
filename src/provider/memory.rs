use std::collections::{HashMap, HashSet};

use crate::models::Entry;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{ListingProvider, ROOT_PATH};

/// 纯内存目录树，测试与演示用
///
/// 目录用完整相对路径注册（根为 "."），可以注入"拒绝访问"
/// 目录，并记录每一次列取调用以便断言去重行为。
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    tree: HashMap<String, Vec<Entry>>,
    denied: HashSet<String>,
    calls: Vec<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        let mut tree = HashMap::new();
        tree.insert(ROOT_PATH.to_string(), Vec::new());
        Self {
            tree,
            denied: HashSet::new(),
            calls: Vec::new(),
        }
    }

    /// 注册一个目录并在其父目录的列表中追加对应条目
    ///
    /// 父目录必须已经存在（根目录 "." 始终存在）。
    pub fn add_dir(&mut self, path: &str) {
        let (parent, name) = split_parent(path);
        if let Some(listing) = self.tree.get_mut(&parent) {
            listing.push(Entry::directory(name));
        }
        self.tree.entry(path.to_string()).or_default();
    }

    /// 在指定目录下追加一个文件条目
    pub fn add_file(&mut self, dir: &str, name: &str, size: u64) {
        if let Some(listing) = self.tree.get_mut(dir) {
            listing.push(Entry::file(name, size));
        }
    }

    /// 将一个目录标记为拒绝访问（父目录中的条目保留）
    pub fn deny(&mut self, path: &str) {
        self.denied.insert(path.to_string());
    }

    /// 全部列取调用的路径记录，按调用顺序
    pub fn listing_calls(&self) -> &[String] {
        &self.calls
    }

    /// 指定路径被列取的次数
    pub fn calls_for(&self, path: &str) -> usize {
        self.calls.iter().filter(|p| p.as_str() == path).count()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn split_parent(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(pos) if pos > 1 => (path[..pos].to_string(), path[pos + 1..].to_string()),
        Some(pos) => (ROOT_PATH.to_string(), path[pos + 1..].to_string()),
        None => (ROOT_PATH.to_string(), path.to_string()),
    }
}

impl ListingProvider for MemoryProvider {
    async fn connect(&mut self) -> ProviderResult<()> {
        Ok(())
    }

    async fn list(&mut self, path: &str) -> ProviderResult<Vec<Entry>> {
        self.calls.push(path.to_string());
        if self.denied.contains(path) {
            return Err(ProviderError::PermissionDenied {
                path: path.to_string(),
            });
        }
        match self.tree.get(path) {
            Some(listing) => Ok(listing.clone()),
            None => Err(ProviderError::Listing {
                path: path.to_string(),
                reason: "目录不存在".to_string(),
            }),
        }
    }

    async fn disconnect(&mut self) {}

    fn describe(&self) -> String {
        "memory://fixture".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_dir_links_into_parent() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./dac");
        provider.add_dir("./dac/aoml");
        provider.add_file("./dac/aoml", "prof.nc", 1024);

        let root = provider.list(ROOT_PATH).await.unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].name, "dac");
        assert!(root[0].is_dir());

        let aoml = provider.list("./dac/aoml").await.unwrap();
        assert_eq!(aoml.len(), 1);
        assert_eq!(aoml[0].size, 1024);
    }

    #[tokio::test]
    async fn test_denied_path_returns_permission_error() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./secret");
        provider.deny("./secret");

        let err = provider.list("./secret").await.unwrap_err();
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./dac");
        provider.list(ROOT_PATH).await.unwrap();
        provider.list("./dac").await.unwrap();
        provider.list("./dac").await.unwrap();

        assert_eq!(provider.listing_calls().len(), 3);
        assert_eq!(provider.calls_for("./dac"), 2);
    }

    #[tokio::test]
    async fn test_unknown_path_is_listing_error() {
        let mut provider = MemoryProvider::new();
        let err = provider.list("./missing").await.unwrap_err();
        assert!(matches!(err, ProviderError::Listing { .. }));
    }
}
