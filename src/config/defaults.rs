use std::collections::HashSet;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认 FTP 服务器
    pub fn default_host() -> String {
        "ftp.ifremer.fr".to_string()
    }

    /// 默认镜像根路径
    pub fn default_root_path() -> String {
        "ifremer/argo".to_string()
    }

    /// 特权文件扩展名
    ///
    /// 科学数据格式，永远逐个目录处理，不允许被指纹去重跳过。
    pub fn privileged_extensions() -> HashSet<String> {
        let mut exts = HashSet::new();

        // NetCDF 及其变体
        exts.insert(".nc".to_string());
        exts.insert(".nc4".to_string());
        exts.insert(".cdf".to_string());

        exts
    }

    /// 观测参数关键词
    pub fn parameter_vocabulary() -> Vec<String> {
        vec![
            "temp".to_string(),
            "temperature".to_string(),
            "sal".to_string(),
            "salinity".to_string(),
            "pres".to_string(),
            "pressure".to_string(),
            "doxy".to_string(),
            "oxygen".to_string(),
            "chlorophyll".to_string(),
            "bbp".to_string(),
            "cndc".to_string(),
            "ph".to_string(),
            "nitrate".to_string(),
        ]
    }

    /// 平台类型关键词
    pub fn platform_vocabulary() -> Vec<String> {
        vec![
            "argo".to_string(),
            "float".to_string(),
            "drifter".to_string(),
            "moored".to_string(),
            "profile".to_string(),
        ]
    }

    /// 数据类型关键词
    pub fn data_type_vocabulary() -> Vec<String> {
        vec![
            "rt".to_string(),
            "realtime".to_string(),
            "delayed".to_string(),
            "adjusted".to_string(),
            "profile".to_string(),
            "trajectory".to_string(),
        ]
    }
}
