use std::io::ErrorKind;
use std::path::PathBuf;

use crate::models::Entry;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{ListingProvider, ROOT_PATH};

/// 本地目录树 Provider
///
/// 把一个本地目录当作镜像根来估算，调试估算逻辑时
/// 不需要真实的 FTP 服务器。
#[derive(Debug, Clone)]
pub struct LocalProvider {
    base: PathBuf,
}

impl LocalProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let trimmed = path.trim_start_matches("./");
        if trimmed.is_empty() || trimmed == ROOT_PATH {
            self.base.clone()
        } else {
            self.base.join(trimmed)
        }
    }

    fn classify(path: &str, err: std::io::Error) -> ProviderError {
        if err.kind() == ErrorKind::PermissionDenied {
            ProviderError::PermissionDenied {
                path: path.to_string(),
            }
        } else {
            ProviderError::Listing {
                path: path.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl ListingProvider for LocalProvider {
    async fn connect(&mut self) -> ProviderResult<()> {
        match tokio::fs::metadata(&self.base).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ProviderError::ConnectionFailed {
                target: self.describe(),
                reason: "不是目录".to_string(),
            }),
            Err(err) => Err(ProviderError::ConnectionFailed {
                target: self.describe(),
                reason: err.to_string(),
            }),
        }
    }

    async fn list(&mut self, path: &str) -> ProviderResult<Vec<Entry>> {
        let full = self.resolve(path);
        let mut reader = tokio::fs::read_dir(&full)
            .await
            .map_err(|err| Self::classify(path, err))?;

        let mut entries = Vec::new();
        loop {
            let dirent = match reader.next_entry().await {
                Ok(Some(dirent)) => dirent,
                Ok(None) => break,
                Err(err) => return Err(Self::classify(path, err)),
            };
            let name = dirent.file_name().to_string_lossy().to_string();
            // 损坏的软链接等拿不到元数据的条目直接跳过
            match dirent.metadata().await {
                Ok(metadata) if metadata.is_dir() => entries.push(Entry::directory(name)),
                Ok(metadata) => entries.push(Entry::file(name, metadata.len())),
                Err(err) => {
                    tracing::warn!("跳过无法读取的条目 {}: {}", name, err);
                }
            }
        }

        // 按名称排序，保证列取顺序稳定
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn disconnect(&mut self) {}

    fn describe(&self) -> String {
        format!("local://{}", self.base.display())
    }
}
