pub mod bbs;
pub mod nn;
pub mod oracle;
pub mod partition;
pub mod range;
pub mod set;

pub use bbs::{bbs_skyline, BbsEngine, BbsStats};
pub use nn::{nn, nn_multi, BatchReport, QueryAnswer, QueryDispatcher, QueryResult};
pub use oracle::{count_within_oracle, count_within_scan, nn_oracle, skyline_oracle, skyline_oracle_with};
pub use partition::{merge, partition, partitioned_indexes, PartitionedSkyline, PartitionedStats};
pub use range::{count_within, window, window_indexed, WindowQuery};
pub use set::SkylineSet;
