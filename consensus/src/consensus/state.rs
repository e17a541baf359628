//! Engine state guarded by the single writer lock

use consensus_core::{DagConfig, KType};

use crate::consensus::dag::BlockRelations;
use crate::consensus::ghostdag::{GhostdagManager, GhostdagStore};
use crate::consensus::types::OrphanReport;
use crate::pipeline::{DepsManager, VirtualProcessor};

/// Everything a query may read and `add_block` may write.
pub struct DagState {
    pub relations: BlockRelations,
    pub store: GhostdagStore,
    pub ghostdag: GhostdagManager,
    pub virtual_processor: VirtualProcessor,
    pub deps: DepsManager,
    /// Evictions not yet drained by the caller
    pub orphan_reports: Vec<OrphanReport>,
}

impl DagState {
    pub fn new(k: KType) -> Self {
        Self {
            relations: BlockRelations::new(),
            store: GhostdagStore::new(),
            ghostdag: GhostdagManager::new(k),
            virtual_processor: VirtualProcessor::new(),
            deps: DepsManager::new(),
            orphan_reports: Vec::new(),
        }
    }

    pub fn from_config(config: &DagConfig) -> Self {
        Self::new(config.ghostdag_k)
    }
}
