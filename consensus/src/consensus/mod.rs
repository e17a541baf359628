//! Consensus module for the Phoenix blockDAG
//!
//! This module implements the coloring and confirmation logic using the
//! GHOSTDAG algorithm, DAG indexing, and difficulty statistics.

pub mod confirmations;
pub mod dag;
pub mod difficulty;
pub mod ghostdag;
pub mod state;
pub mod types;

pub use confirmations::ConfirmationCalculator;
pub use dag::{BlockRelations, DagTopology, Degree, ReachabilityService};
pub use difficulty::{DifficultyManager, DifficultyWindow, MiningStats};
pub use ghostdag::{BlueSet, GhostdagData, GhostdagManager, GhostdagProtocol, GhostdagStore};
pub use state::DagState;
pub use types::{BlockProcessingResult, BlockStatus, EvictionReason, OrphanReport, SinkChange};
