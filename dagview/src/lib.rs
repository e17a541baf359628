//! dagview - Phoenix blockDAG report tool
//!
//! Loads a block dump, runs it through the coloring engine and produces the
//! JSON report consumed by the DAG rendering layer.

pub mod cli;
pub mod config;
pub mod report;
pub mod ui;

pub use cli::Args;
pub use report::{load_blocks, run, Report};
