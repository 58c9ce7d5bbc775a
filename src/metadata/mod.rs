pub mod features;
pub mod temporal;

pub use features::{FeatureCollector, FeatureSet, FeatureVocabulary};
pub use temporal::{TemporalCollector, TemporalRange};
