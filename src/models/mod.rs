pub mod entry;
pub mod node;
pub mod outcome;

pub use entry::{Entry, EntryKind};
pub use node::{EstimationMethod, EstimationNode, SampleDetail};
pub use outcome::{EstimateOutcome, RunCounters, TopLevelOverview};
