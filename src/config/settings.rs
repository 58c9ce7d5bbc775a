use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use anyhow::Result;

use crate::metadata::FeatureVocabulary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 数据源配置
    pub server: ServerConfig,

    /// 估算配置
    pub scan: ScanConfig,

    /// 特征关键词词表
    pub vocabulary: FeatureVocabulary,

    /// 报告配置
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// FTP 服务器地址
    pub host: String,

    /// 镜像根路径
    pub root_path: String,

    /// 登录用户名
    pub user: String,

    /// 登录口令
    pub password: String,

    /// 连接超时（秒）
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 最大递归深度
    pub max_depth: u32,

    /// 每个目录的抽样文件数
    pub sample_size: usize,

    /// 随机数种子，None 表示每次运行随机
    pub seed: Option<u64>,

    /// 特权文件扩展名
    pub privileged_extensions: HashSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 文件类型分布展示的条目数
    pub top_file_types: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            scan: ScanConfig::default(),
            vocabulary: FeatureVocabulary::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::config::defaults::DefaultConfig::default_host(),
            root_path: crate::config::defaults::DefaultConfig::default_root_path(),
            user: "anonymous".to_string(),
            password: "anonymous@".to_string(),
            connect_timeout_secs: 60,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            sample_size: 3,
            seed: None,
            privileged_extensions: crate::config::defaults::DefaultConfig::privileged_extensions(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_file_types: 10 }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("ftp-mirror-estimator");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果文件不存在则创建默认配置
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }
}
