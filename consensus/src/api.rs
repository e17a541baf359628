//! Thread-safe handle over the blockDAG engine
//!
//! `PhoenixDag` owns the engine state behind a single `RwLock`: ingestion and
//! eviction take the write lock, every query takes the read lock briefly.

use std::sync::Arc;
use std::time::Instant;

use consensus_core::{Block, BlockColor, BlockView, DagConfig, DagError, DagResult, Hash};
use parking_lot::RwLock;

use crate::consensus::confirmations::ConfirmationCalculator;
use crate::consensus::dag::{DagTopology, Degree, ReachabilityService, TraversalFrontier};
use crate::consensus::difficulty::{DifficultyManager, DifficultyWindow, MiningStats};
use crate::consensus::ghostdag::{BlueSet, GhostdagData};
use crate::consensus::state::DagState;
use crate::consensus::types::{BlockProcessingResult, OrphanReport};
use crate::pipeline::BlockProcessor;

/// Blue-set aware blockDAG engine
#[derive(Clone)]
pub struct PhoenixDag {
    config: Arc<DagConfig>,
    processor: BlockProcessor,
    difficulty: DifficultyManager,
    state: Arc<RwLock<DagState>>,
}

impl PhoenixDag {
    pub fn new(config: DagConfig) -> Self {
        Self {
            processor: BlockProcessor::from_config(&config),
            difficulty: DifficultyManager::from_config(&config),
            state: Arc::new(RwLock::new(DagState::from_config(&config))),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &DagConfig {
        &self.config
    }

    /// Ingest a block. In out-of-order mode a block with missing parents is
    /// held and reported as pending; it is ingested once they all arrive.
    pub fn add_block(&self, block: Block) -> DagResult<BlockProcessingResult> {
        self.add_block_at(block, Instant::now())
    }

    /// Same as `add_block` with an explicit clock reading for orphan expiry
    pub fn add_block_at(&self, block: Block, now: Instant) -> DagResult<BlockProcessingResult> {
        let mut state = self.state.write();
        self.processor.process(&mut state, block, now)
    }

    pub fn evict_expired_orphans(&self) -> usize {
        self.evict_expired_orphans_at(Instant::now())
    }

    pub fn evict_expired_orphans_at(&self, now: Instant) -> usize {
        let mut state = self.state.write();
        self.processor.evict_expired(&mut state, now)
    }

    /// Takes the eviction reports accumulated since the last call
    pub fn drain_orphan_reports(&self) -> Vec<OrphanReport> {
        std::mem::take(&mut self.state.write().orphan_reports)
    }

    pub fn pending_count(&self) -> usize {
        self.state.read().deps.len()
    }

    /// Blocks still waiting for parents, oldest first
    pub fn pending_blocks(&self) -> Vec<Hash> {
        self.state.read().deps.hashes()
    }

    pub fn is_pending(&self, hash: &Hash) -> bool {
        self.state.read().deps.is_orphan(hash)
    }

    /// Whether `hash` is indexed (pending blocks are not)
    pub fn contains(&self, hash: &Hash) -> bool {
        self.state.read().relations.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.state.read().relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().relations.is_empty()
    }

    pub fn genesis(&self) -> Option<Hash> {
        self.state.read().relations.genesis()
    }

    /// Blocks without children, sorted by hash
    pub fn tips(&self) -> Vec<Hash> {
        self.state.read().relations.get_tips()
    }

    pub fn sink(&self) -> Option<Hash> {
        self.state.read().virtual_processor.sink()
    }

    pub fn virtual_blue_score(&self) -> Option<u64> {
        self.state.read().virtual_processor.virtual_blue_score()
    }

    pub fn get_block(&self, hash: &Hash) -> Option<Arc<Block>> {
        self.state.read().relations.get(hash).cloned()
    }

    pub fn get_parents(&self, hash: &Hash) -> DagResult<Vec<Hash>> {
        let state = self.state.read();
        state.relations.get_parents(hash).map(<[Hash]>::to_vec).ok_or(DagError::UnknownBlock(*hash))
    }

    pub fn get_children(&self, hash: &Hash) -> DagResult<Vec<Hash>> {
        let state = self.state.read();
        state.relations.get_children(hash).map(<[Hash]>::to_vec).ok_or(DagError::UnknownBlock(*hash))
    }

    pub fn degree(&self, hash: &Hash) -> DagResult<Degree> {
        self.state.read().relations.degree(hash).ok_or(DagError::UnknownBlock(*hash))
    }

    /// Strict ancestry between two indexed blocks
    pub fn is_dag_ancestor_of(&self, ancestor: Hash, descendant: Hash) -> bool {
        let state = self.state.read();
        ReachabilityService::new(&state.relations, &state.store).is_dag_ancestor_of(ancestor, descendant)
    }

    /// `hash` and its whole past in reverse-topological order
    pub fn traverse_dag(&self, hash: &Hash) -> DagResult<Traversal> {
        self.traversal(hash, false)
    }

    /// Past of `hash` without `hash` itself, in reverse-topological order
    pub fn get_ancestors(&self, hash: &Hash) -> DagResult<Traversal> {
        self.traversal(hash, true)
    }

    fn traversal(&self, hash: &Hash, skip_start: bool) -> DagResult<Traversal> {
        let blue_score = self.state.read().store.blue_score(hash).ok_or(DagError::UnknownBlock(*hash))?;
        Ok(Traversal { state: self.state.clone(), frontier: TraversalFrontier::new(*hash, blue_score), skip_start })
    }

    /// Past of `hash` including itself, parents before children
    pub fn topological_sort(&self, hash: &Hash) -> DagResult<Vec<Hash>> {
        let state = self.state.read();
        if !state.relations.contains(hash) {
            return Err(DagError::UnknownBlock(*hash));
        }
        Ok(DagTopology::new(&state.relations, &state.store).topological_sort(*hash))
    }

    pub fn anticone(&self, hash: &Hash) -> DagResult<Vec<Hash>> {
        let state = self.state.read();
        if !state.relations.contains(hash) {
            return Err(DagError::UnknownBlock(*hash));
        }
        Ok(DagTopology::new(&state.relations, &state.store).anticone(*hash))
    }

    /// Color of an indexed block as seen from the virtual block
    pub fn color(&self, hash: &Hash) -> DagResult<BlockColor> {
        self.state.read().virtual_processor.color(hash).ok_or(DagError::UnknownBlock(*hash))
    }

    pub fn is_blue_block(&self, hash: &Hash) -> DagResult<bool> {
        self.color(hash).map(|c| c.is_blue())
    }

    pub fn is_red_block(&self, hash: &Hash) -> DagResult<bool> {
        self.color(hash).map(|c| c.is_red())
    }

    pub fn blue_score(&self, hash: &Hash) -> DagResult<u64> {
        self.state.read().store.blue_score(hash).ok_or(DagError::UnknownBlock(*hash))
    }

    pub fn ghostdag_data(&self, hash: &Hash) -> DagResult<Arc<GhostdagData>> {
        self.state.read().store.get(hash).cloned().ok_or(DagError::UnknownBlock(*hash))
    }

    /// Coloring of `tip`'s past as seen from `tip`
    pub fn blue_set(&self, tip: &Hash) -> DagResult<BlueSet> {
        let state = self.state.read();
        state.ghostdag.blue_set(&state.store, *tip)
    }

    /// Selected chain from `tip` down to genesis, tip first
    pub fn selected_chain(&self, tip: &Hash) -> DagResult<Vec<Hash>> {
        let state = self.state.read();
        state.ghostdag.selected_chain(&state.store, *tip)
    }

    /// Blue blocks above `hash` in the blue set of the current sink
    pub fn get_confirmations(&self, hash: &Hash) -> DagResult<u64> {
        let state = self.state.read();
        let sink = state.virtual_processor.sink().ok_or(DagError::UnknownBlock(*hash))?;
        ConfirmationCalculator::new(&state.store).confirmations(sink, *hash)
    }

    /// Blue blocks above `hash` in the blue set of `tip`
    pub fn confirmations_at(&self, tip: &Hash, hash: &Hash) -> DagResult<u64> {
        let state = self.state.read();
        ConfirmationCalculator::new(&state.store).confirmations(*tip, *hash)
    }

    /// Visualization records for every indexed block, by blue score then hash
    pub fn block_views(&self) -> Vec<BlockView> {
        let state = self.state.read();
        let mut views: Vec<BlockView> = state
            .relations
            .blocks()
            .map(|block| BlockView {
                hash: block.hash,
                parent_hashes: block.parent_hashes.clone(),
                blue_score: state.store.blue_score(&block.hash).unwrap_or_default(),
                is_canonical: state.virtual_processor.color(&block.hash).map_or(false, |c| c.is_blue()),
            })
            .collect();
        views.sort_by_key(|view| (view.blue_score, view.hash));
        views
    }

    /// Difficulty and hash rate over the tail of the sink's selected chain
    pub fn mining_stats(&self) -> MiningStats {
        let state = self.state.read();
        let window_size = self.difficulty.window_size();
        let chain = state.virtual_processor.chain();
        let skip = chain.len().saturating_sub(window_size);
        let blocks: Vec<Arc<Block>> = chain.skip(skip).filter_map(|hash| state.relations.get(hash).cloned()).collect();
        let window = DifficultyWindow::from_chain(window_size, blocks.iter().map(|b| b.as_ref()));
        self.difficulty.mining_stats(&window)
    }
}

impl Default for PhoenixDag {
    fn default() -> Self {
        Self::new(DagConfig::default())
    }
}

/// Lazy reverse-topological walk over a block's past.
///
/// Takes the read lock for each step. The past of an indexed block never
/// changes, so blocks ingested mid-walk do not affect what it yields.
#[derive(Clone)]
pub struct Traversal {
    state: Arc<RwLock<DagState>>,
    frontier: TraversalFrontier,
    skip_start: bool,
}

impl Traversal {
    /// Rewind to the starting block
    pub fn restart(&mut self) {
        self.frontier.restart();
    }

    pub fn start(&self) -> Hash {
        self.frontier.start()
    }
}

impl Iterator for Traversal {
    type Item = Arc<Block>;

    fn next(&mut self) -> Option<Arc<Block>> {
        let state = self.state.read();
        loop {
            let hash = self.frontier.next_hash(&state.relations, &state.store)?;
            if self.skip_start && hash == self.frontier.start() {
                continue;
            }
            return state.relations.get(&hash).cloned();
        }
    }
}
