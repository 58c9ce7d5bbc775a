pub mod config;
pub mod estimator;
pub mod metadata;
pub mod models;
pub mod provider;
pub mod reporter;
pub mod utils;

// 重新导出常用模块
pub use estimator::{EstimateOptions, Estimator, PatternMemo, PatternSignature, SiblingGrouper};
pub use models::{EstimateOutcome, EstimationMethod, EstimationNode};
pub use provider::{FtpProvider, ListingProvider, LocalProvider, MemoryProvider, ProviderError};
