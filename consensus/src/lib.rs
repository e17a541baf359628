//! Consensus library for the Phoenix blockDAG
//!
//! This library colors blocks blue or red with the GHOSTDAG k-cluster rule,
//! counts confirmations, traverses the DAG and derives mining statistics
//! from the selected chain.

pub mod api;
pub mod consensus;
pub mod pipeline;

// Re-export key types for easier access
pub use api::{PhoenixDag, Traversal};
pub use consensus::dag::{BlockRelations, DagTopology, Degree, ReachabilityService};
pub use consensus::difficulty::{DifficultyManager, DifficultyWindow, MiningStats};
pub use consensus::ghostdag::{BlueSet, GhostdagData, GhostdagManager, GhostdagProtocol, GhostdagStore};
pub use consensus::types::{BlockProcessingResult, BlockStatus, EvictionReason, OrphanReport, SinkChange};
pub use consensus_core::{
    Block, BlockColor, BlockView, ConfigError, DagConfig, DagError, DagResult, Hash, IngestionMode,
};

// Re-export pipeline types
pub use pipeline::{BlockProcessor, DepsManager, VirtualProcessor};
