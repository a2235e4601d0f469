pub mod config;
pub mod fetch;
pub mod happiness;
pub mod output;
pub mod process;

pub use config::{IndicatorSpec, PipelineConfig};
pub use process::{CombinedRecord, Observation};
