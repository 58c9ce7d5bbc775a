pub mod cache;
pub mod context;
pub mod engine;
pub mod grouper;
pub mod memo;
pub mod sampler;
pub mod signature;

pub use cache::{CachedListing, DirectoryCache};
pub use context::{EstimationContext, ProgressFn, ProgressUpdate};
pub use engine::{EstimateOptions, Estimator};
pub use grouper::{SiblingGroup, SiblingGrouper};
pub use memo::PatternMemo;
pub use sampler::{extrapolate, select_sample, SampleEstimate};
pub use signature::{PatternSignature, PrivilegedFormats};
