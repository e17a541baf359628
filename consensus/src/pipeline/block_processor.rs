//! Block processor for consensus
//!
//! This module provides the main block processing logic: structural checks,
//! the pending pool for blocks with missing parents, GHOSTDAG coloring and
//! the virtual recoloring that follows every accepted block.

use consensus_core::{Block, DagConfig, DagError, DagResult, Hash, IngestionMode};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::consensus::state::DagState;
use crate::consensus::types::{BlockProcessingResult, EvictionReason, OrphanReport};

/// Block processor for consensus
#[derive(Debug, Clone)]
pub struct BlockProcessor {
    mode: IngestionMode,
    orphan_timeout: Duration,
    max_orphans: usize,
}

impl BlockProcessor {
    pub fn new(mode: IngestionMode, orphan_timeout: Duration, max_orphans: usize) -> Self {
        Self { mode, orphan_timeout, max_orphans }
    }

    pub fn from_config(config: &DagConfig) -> Self {
        Self::new(config.ingestion_mode, config.orphan_timeout(), config.max_orphans)
    }

    pub fn mode(&self) -> IngestionMode {
        self.mode
    }

    /// Process a complete block
    ///
    /// A returned error means the block was rejected and the indexed DAG is
    /// exactly as it was before the call. Expired pending blocks are swept
    /// first regardless of the outcome.
    pub fn process(&self, state: &mut DagState, block: Block, now: Instant) -> DagResult<BlockProcessingResult> {
        let hash = block.hash;
        self.evict_expired(state, now);

        self.validate_structure(state, &block)?;

        if state.relations.contains(&hash) || state.deps.is_orphan(&hash) {
            debug!("Ignoring duplicate block {}", hash);
            return Ok(BlockProcessingResult::duplicate(hash));
        }

        let missing: Vec<Hash> =
            block.parent_hashes.iter().filter(|p| !state.relations.contains(p)).copied().collect();
        if !missing.is_empty() {
            return self.hold_pending(state, block, missing, now);
        }

        self.commit(state, block)?;
        let mut result = BlockProcessingResult::accepted(hash);
        self.resolve_dependents(state, hash, &mut result);
        Ok(result)
    }

    /// Drops pending blocks older than the orphan timeout.
    pub fn evict_expired(&self, state: &mut DagState, now: Instant) -> usize {
        let reports = state.deps.evict_expired(now, self.orphan_timeout);
        let evicted = reports.len();
        record_evictions(state, reports);
        evicted
    }

    fn validate_structure(&self, state: &DagState, block: &Block) -> DagResult<()> {
        if block.parent_hashes.contains(&block.hash) {
            return Err(DagError::CyclicReference { block: block.hash, via: block.hash });
        }
        if let Some(parent) = block.repeated_parent() {
            return Err(DagError::DuplicateParent { block: block.hash, parent });
        }
        if block.is_genesis() {
            if let Some(genesis) = state.relations.genesis() {
                if genesis != block.hash {
                    return Err(DagError::MultipleGenesis { block: block.hash, genesis });
                }
            }
        }
        Ok(())
    }

    fn hold_pending(
        &self,
        state: &mut DagState,
        block: Block,
        missing: Vec<Hash>,
        now: Instant,
    ) -> DagResult<BlockProcessingResult> {
        let hash = block.hash;
        if self.mode == IngestionMode::Strict {
            return Err(DagError::UnknownParent { block: hash, parent: missing[0] });
        }
        if let Some(via) = state.deps.would_cycle(hash, &missing) {
            warn!("Rejecting block {}: pending parents lead back to it via {}", hash, via);
            return Err(DagError::CyclicReference { block: hash, via });
        }

        while state.deps.len() >= self.max_orphans {
            let reports = state.deps.evict_oldest();
            if reports.is_empty() {
                break;
            }
            record_evictions(state, reports);
        }

        debug!("Block {} is pending on {} missing parent(s)", hash, missing.len());
        state.deps.add_orphan(block, missing.clone(), now);
        Ok(BlockProcessingResult::pending(hash, missing))
    }

    /// Colors and indexes a block whose parents are all indexed, then
    /// recolors the virtual block. Rolls the block back out on failure.
    fn commit(&self, state: &mut DagState, block: Block) -> DagResult<()> {
        let hash = block.hash;
        let data = state.ghostdag.calculate(&state.relations, &state.store, &block.parent_hashes)?;

        for parent in &block.parent_hashes {
            let parent_score = state.store.blue_score(parent).ok_or(DagError::UnknownBlock(*parent))?;
            if data.blue_score <= parent_score {
                return Err(DagError::InconsistentColoring(format!(
                    "block {} has blue score {} not above parent {} with {}",
                    hash, data.blue_score, parent, parent_score
                )));
            }
        }

        let blue_score = data.blue_score;
        state.relations.add_block(Arc::new(block));
        state.store.insert(hash, Arc::new(data));

        match state.virtual_processor.update(&state.ghostdag, &state.relations, &state.store) {
            Ok(change) => {
                debug!("Accepted block {} with blue score {}", hash, blue_score);
                if change.previous != Some(change.sink) {
                    info!(
                        "Sink moved to {} (+{} / -{} chain blocks)",
                        change.sink, change.added, change.removed
                    );
                }
                Ok(())
            }
            Err(e) => {
                warn!("Rolling back block {}: {}", hash, e);
                state.relations.remove_tip(&hash);
                state.store.remove(&hash);
                Err(e)
            }
        }
    }

    /// Ingests pending blocks unlocked by `hash`, transitively, oldest first.
    fn resolve_dependents(&self, state: &mut DagState, hash: Hash, result: &mut BlockProcessingResult) {
        let mut queue = VecDeque::from([hash]);
        while let Some(parent) = queue.pop_front() {
            for dependent in state.deps.resolve(&parent) {
                let dependent_hash = dependent.hash;
                match self.commit(state, dependent) {
                    Ok(()) => {
                        result.resolved.push(dependent_hash);
                        queue.push_back(dependent_hash);
                    }
                    Err(e) => {
                        warn!("Pending block {} rejected: {}", dependent_hash, e);
                        let reports = state.deps.evict_dependents_of(&dependent_hash, EvictionReason::ParentRejected);
                        record_evictions(state, reports);
                        result.rejected.push((dependent_hash, e));
                    }
                }
            }
        }
    }
}

fn record_evictions(state: &mut DagState, reports: Vec<OrphanReport>) {
    for report in &reports {
        warn!("Evicted pending block {} ({:?})", report.hash, report.reason);
    }
    state.orphan_reports.extend(reports);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::types::BlockStatus;

    fn h(id: u64) -> Hash {
        Hash::from_u64_word(id)
    }

    fn block(id: u64, parents: &[u64]) -> Block {
        Block::new(h(id), parents.iter().map(|p| h(*p)).collect(), id * 1000)
    }

    fn processor(mode: IngestionMode) -> BlockProcessor {
        BlockProcessor::new(mode, Duration::from_secs(60), 8)
    }

    #[test]
    fn test_accepts_genesis_and_child() {
        let processor = processor(IngestionMode::Strict);
        let mut state = DagState::new(18);
        let now = Instant::now();

        assert!(processor.process(&mut state, block(1, &[]), now).unwrap().is_accepted());
        assert!(processor.process(&mut state, block(2, &[1]), now).unwrap().is_accepted());
        assert_eq!(state.store.blue_score(&h(2)), Some(1));
        assert_eq!(state.virtual_processor.sink(), Some(h(2)));
    }

    #[test]
    fn test_structural_rejections() {
        let processor = processor(IngestionMode::OutOfOrder);
        let mut state = DagState::new(18);
        let now = Instant::now();
        processor.process(&mut state, block(1, &[]), now).unwrap();

        assert_eq!(
            processor.process(&mut state, block(2, &[2]), now),
            Err(DagError::CyclicReference { block: h(2), via: h(2) })
        );
        assert_eq!(
            processor.process(&mut state, block(3, &[1, 1]), now),
            Err(DagError::DuplicateParent { block: h(3), parent: h(1) })
        );
        assert_eq!(
            processor.process(&mut state, block(4, &[]), now),
            Err(DagError::MultipleGenesis { block: h(4), genesis: h(1) })
        );
        assert_eq!(state.relations.len(), 1);
        assert!(state.deps.is_empty());
    }

    #[test]
    fn test_strict_mode_rejects_missing_parent() {
        let processor = processor(IngestionMode::Strict);
        let mut state = DagState::new(18);
        let now = Instant::now();
        processor.process(&mut state, block(1, &[]), now).unwrap();

        assert_eq!(
            processor.process(&mut state, block(3, &[2]), now),
            Err(DagError::UnknownParent { block: h(3), parent: h(2) })
        );
        assert!(state.deps.is_empty());
    }

    #[test]
    fn test_out_of_order_resolves_transitively() {
        let processor = processor(IngestionMode::OutOfOrder);
        let mut state = DagState::new(18);
        let now = Instant::now();

        let result = processor.process(&mut state, block(3, &[2]), now).unwrap();
        assert_eq!(result.status, BlockStatus::Pending);
        assert_eq!(result.missing_parents, vec![h(2)]);
        assert!(processor.process(&mut state, block(2, &[1]), now).unwrap().is_pending());

        let result = processor.process(&mut state, block(1, &[]), now).unwrap();
        assert!(result.is_accepted());
        assert_eq!(result.resolved, vec![h(2), h(3)]);
        assert!(state.deps.is_empty());
        assert_eq!(state.store.blue_score(&h(3)), Some(2));
    }

    #[test]
    fn test_pending_cycle_rejected() {
        let processor = processor(IngestionMode::OutOfOrder);
        let mut state = DagState::new(18);
        let now = Instant::now();

        processor.process(&mut state, block(3, &[2]), now).unwrap();
        assert_eq!(
            processor.process(&mut state, block(2, &[3]), now),
            Err(DagError::CyclicReference { block: h(2), via: h(3) })
        );
        assert_eq!(state.deps.len(), 1);
    }

    #[test]
    fn test_duplicate_is_noop() {
        let processor = processor(IngestionMode::OutOfOrder);
        let mut state = DagState::new(18);
        let now = Instant::now();
        processor.process(&mut state, block(1, &[]), now).unwrap();
        processor.process(&mut state, block(5, &[4]), now).unwrap();

        assert_eq!(processor.process(&mut state, block(1, &[]), now).unwrap().status, BlockStatus::Duplicate);
        assert_eq!(processor.process(&mut state, block(5, &[4]), now).unwrap().status, BlockStatus::Duplicate);
        assert_eq!(state.relations.len(), 1);
        assert_eq!(state.deps.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let processor = BlockProcessor::new(IngestionMode::OutOfOrder, Duration::from_secs(60), 2);
        let mut state = DagState::new(18);
        let now = Instant::now();

        processor.process(&mut state, block(10, &[9]), now).unwrap();
        processor.process(&mut state, block(11, &[9]), now).unwrap();
        processor.process(&mut state, block(12, &[9]), now).unwrap();

        assert_eq!(state.deps.len(), 2);
        assert!(!state.deps.is_orphan(&h(10)));
        assert_eq!(state.orphan_reports.len(), 1);
        assert_eq!(state.orphan_reports[0].hash, h(10));
        assert_eq!(state.orphan_reports[0].reason, EvictionReason::Capacity);
    }

    #[test]
    fn test_timeout_sweeps_on_next_call() {
        let processor = BlockProcessor::new(IngestionMode::OutOfOrder, Duration::from_millis(100), 8);
        let mut state = DagState::new(18);
        let start = Instant::now();

        processor.process(&mut state, block(3, &[2]), start).unwrap();
        processor.process(&mut state, block(1, &[]), start + Duration::from_millis(150)).unwrap();

        assert!(state.deps.is_empty());
        assert_eq!(state.orphan_reports.len(), 1);
        assert_eq!(state.orphan_reports[0].reason, EvictionReason::Expired);
        assert_eq!(state.orphan_reports[0].missing_parents, vec![h(2)]);
    }
}
