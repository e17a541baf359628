pub mod params;

pub use params::{DagConfig, IngestionMode};
