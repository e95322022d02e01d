pub mod fetch;
pub mod history;
pub mod sample;

pub use history::{HistoryData, HistoryStats, RowError, filter_trend, load_history};
pub use sample::{SampleAssets, SampleSpec, generate_sample, write_assets};
