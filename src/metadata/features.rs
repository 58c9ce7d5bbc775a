use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::DefaultConfig;

/// 特征关键词词表，可通过配置文件替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVocabulary {
    /// 观测参数关键词
    pub parameters: Vec<String>,
    /// 平台类型关键词
    pub platforms: Vec<String>,
    /// 数据类型关键词
    pub data_types: Vec<String>,
}

impl Default for FeatureVocabulary {
    fn default() -> Self {
        Self {
            parameters: DefaultConfig::parameter_vocabulary(),
            platforms: DefaultConfig::platform_vocabulary(),
            data_types: DefaultConfig::data_type_vocabulary(),
        }
    }
}

/// 命中过的特征关键词集合
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    pub parameters: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
    pub data_types: BTreeSet<String>,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.platforms.is_empty() && self.data_types.is_empty()
    }
}

/// 从路径与文件名中识别数据特征的收集器
///
/// 大小写不敏感的子串匹配，命中只增不减。
pub struct FeatureCollector {
    vocabulary: FeatureVocabulary,
    set: FeatureSet,
}

impl FeatureCollector {
    pub fn new(vocabulary: FeatureVocabulary) -> Self {
        Self {
            vocabulary,
            set: FeatureSet::default(),
        }
    }

    /// 扫描一个完整路径，记录命中的关键词
    pub fn observe(&mut self, path: &str) {
        let lowered = path.to_lowercase();
        for term in &self.vocabulary.parameters {
            if lowered.contains(term.as_str()) {
                self.set.parameters.insert(term.clone());
            }
        }
        for term in &self.vocabulary.platforms {
            if lowered.contains(term.as_str()) {
                self.set.platforms.insert(term.clone());
            }
        }
        for term in &self.vocabulary.data_types {
            if lowered.contains(term.as_str()) {
                self.set.data_types.insert(term.clone());
            }
        }
    }

    pub fn set(&self) -> &FeatureSet {
        &self.set
    }

    pub fn into_set(self) -> FeatureSet {
        self.set
    }
}

impl Default for FeatureCollector {
    fn default() -> Self {
        Self::new(FeatureVocabulary::default())
    }
}
