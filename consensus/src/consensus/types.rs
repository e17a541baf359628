//! Engine-specific types
//!
//! This module defines types returned by ingestion and eviction.

use consensus_core::{DagError, Hash};
use serde::{Deserialize, Serialize};

/// Outcome of handing a block to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    /// Block is indexed and colored
    Accepted,
    /// Block is held until its parents arrive
    Pending,
    /// Block was already indexed or pending
    Duplicate,
}

/// Block processing result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProcessingResult {
    pub status: BlockStatus,
    pub hash: Hash,
    /// Parents still missing when the block went pending
    pub missing_parents: Vec<Hash>,
    /// Pending blocks accepted because this block arrived, in acceptance order
    pub resolved: Vec<Hash>,
    /// Pending dependents that failed once their parents arrived
    pub rejected: Vec<(Hash, DagError)>,
}

impl BlockProcessingResult {
    pub fn accepted(hash: Hash) -> Self {
        Self::with_status(BlockStatus::Accepted, hash)
    }

    pub fn pending(hash: Hash, missing_parents: Vec<Hash>) -> Self {
        Self { missing_parents, ..Self::with_status(BlockStatus::Pending, hash) }
    }

    pub fn duplicate(hash: Hash) -> Self {
        Self::with_status(BlockStatus::Duplicate, hash)
    }

    fn with_status(status: BlockStatus, hash: Hash) -> Self {
        Self { status, hash, missing_parents: Vec::new(), resolved: Vec::new(), rejected: Vec::new() }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == BlockStatus::Accepted
    }

    pub fn is_pending(&self) -> bool {
        self.status == BlockStatus::Pending
    }
}

/// Why a pending block was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Waited longer than the orphan timeout
    Expired,
    /// Pending pool was full and this was the oldest entry
    Capacity,
    /// A pending parent it depended on was evicted
    ParentEvicted,
    /// A pending parent it depended on was rejected
    ParentRejected,
}

/// A pending block discarded without ever being indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReport {
    pub hash: Hash,
    pub missing_parents: Vec<Hash>,
    pub reason: EvictionReason,
}

impl From<OrphanReport> for DagError {
    fn from(report: OrphanReport) -> Self {
        DagError::OrphanBlock { block: report.hash, missing: report.missing_parents }
    }
}

/// Movement of the sink (best tip) after recoloring the virtual block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkChange {
    pub previous: Option<Hash>,
    pub sink: Hash,
    /// Chain blocks appended above the fork point
    pub added: usize,
    /// Chain blocks dropped above the fork point
    pub removed: usize,
}

impl SinkChange {
    pub fn is_reorg(&self) -> bool {
        self.removed > 0
    }
}
