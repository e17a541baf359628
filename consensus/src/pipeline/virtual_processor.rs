//! Virtual processor for consensus
//!
//! This module recolors the virtual block (the block whose parents are all
//! current tips) after each accepted block and keeps the global color map
//! and the selected chain index in step with it.

use consensus_core::{BlockColor, BlockHashMap, DagError, DagResult, Hash};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::consensus::dag::BlockRelations;
use crate::consensus::ghostdag::{GhostdagData, GhostdagManager, GhostdagStore};
use crate::consensus::types::SinkChange;

/// Virtual processor for virtual state calculation
#[derive(Default)]
pub struct VirtualProcessor {
    virtual_data: Option<Arc<GhostdagData>>,
    /// Selected chain of the sink, keyed by blue score
    chain: BTreeMap<u64, Hash>,
    colors: BlockHashMap<BlockColor>,
}

impl VirtualProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recolors the virtual block against the current tips.
    ///
    /// Only the chain segment above the fork point between the old and new
    /// sink is rewritten. Nothing is modified when an error is returned.
    pub fn update(
        &mut self,
        manager: &GhostdagManager,
        relations: &BlockRelations,
        store: &GhostdagStore,
    ) -> DagResult<SinkChange> {
        let tips = relations.get_tips();
        let virtual_data = manager.calculate(relations, store, &tips)?;
        let sink = virtual_data
            .selected_parent
            .ok_or_else(|| DagError::InconsistentColoring("virtual block has no selected parent".to_string()))?;

        // Walk down from the new sink until we meet the current chain
        let mut added: Vec<(u64, Arc<GhostdagData>)> = Vec::new();
        let mut added_hashes = Vec::new();
        let mut current = sink;
        let fork_score = loop {
            let data = store.get(&current).ok_or_else(|| {
                DagError::InconsistentColoring(format!("chain block {} has no ghostdag data", current))
            })?;
            if self.chain.get(&data.blue_score) == Some(&current) {
                break Some(data.blue_score);
            }
            added.push((data.blue_score, data.clone()));
            added_hashes.push(current);
            match data.selected_parent {
                Some(parent) => current = parent,
                None if relations.genesis() == Some(current) => break None,
                None => {
                    return Err(DagError::InconsistentColoring(format!(
                        "selected chain of {} ends at {} which is not genesis",
                        sink, current
                    )))
                }
            }
        };

        let merged = added.iter().flat_map(|(_, d)| d.mergeset()).chain(virtual_data.mergeset());
        for hash in merged {
            if !store.contains(hash) {
                return Err(DagError::InconsistentColoring(format!("mergeset member {} is not indexed", hash)));
            }
        }

        let removed: Vec<(u64, Hash)> = match fork_score {
            Some(score) => self.chain.range(score + 1..).map(|(s, h)| (*s, *h)).collect(),
            None => self.chain.iter().map(|(s, h)| (*s, *h)).collect(),
        };

        // Validation done, apply
        let previous = self.sink();
        if let Some(old_virtual) = self.virtual_data.take() {
            for hash in old_virtual.mergeset() {
                self.colors.remove(hash);
            }
        }
        for (score, hash) in &removed {
            if let Some(data) = store.get(hash) {
                for merged in data.mergeset() {
                    self.colors.remove(merged);
                }
            }
            self.chain.remove(score);
        }
        for ((score, data), hash) in added.iter().zip(&added_hashes) {
            self.colors.extend(data.mergeset_colors());
            self.chain.insert(*score, *hash);
        }
        self.colors.extend(virtual_data.mergeset_colors());

        self.virtual_data = Some(Arc::new(virtual_data));

        Ok(SinkChange { previous, sink, added: added_hashes.len(), removed: removed.len() })
    }

    /// Best tip: the virtual block's selected parent
    pub fn sink(&self) -> Option<Hash> {
        self.virtual_data.as_ref().and_then(|d| d.selected_parent)
    }

    pub fn virtual_blue_score(&self) -> Option<u64> {
        self.virtual_data.as_ref().map(|d| d.blue_score)
    }

    pub fn virtual_data(&self) -> Option<&Arc<GhostdagData>> {
        self.virtual_data.as_ref()
    }

    /// Color of an indexed block as seen from the virtual block
    pub fn color(&self, hash: &Hash) -> Option<BlockColor> {
        self.colors.get(hash).copied()
    }

    pub fn colored_len(&self) -> usize {
        self.colors.len()
    }

    /// Chain block at a given blue score, if the sink's chain has one
    pub fn chain_block_at(&self, blue_score: u64) -> Option<Hash> {
        self.chain.get(&blue_score).copied()
    }

    pub fn is_chain_block(&self, hash: &Hash, blue_score: u64) -> bool {
        self.chain.get(&blue_score) == Some(hash)
    }

    /// Sink's selected chain, genesis first
    pub fn chain(&self) -> impl DoubleEndedIterator<Item = &Hash> + ExactSizeIterator + '_ {
        self.chain.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::Block;

    fn h(id: u64) -> Hash {
        Hash::from_u64_word(id)
    }

    struct Harness {
        manager: GhostdagManager,
        relations: BlockRelations,
        store: GhostdagStore,
        virtual_processor: VirtualProcessor,
    }

    impl Harness {
        fn new(k: u16) -> Self {
            Self {
                manager: GhostdagManager::new(k),
                relations: BlockRelations::new(),
                store: GhostdagStore::new(),
                virtual_processor: VirtualProcessor::new(),
            }
        }

        fn add(&mut self, id: u64, parents: &[u64]) -> SinkChange {
            let parents: Vec<Hash> = parents.iter().map(|p| h(*p)).collect();
            let data = self.manager.calculate(&self.relations, &self.store, &parents).unwrap();
            self.relations.add_block(Arc::new(Block::new(h(id), parents, 0)));
            self.store.insert(h(id), Arc::new(data));
            self.virtual_processor.update(&self.manager, &self.relations, &self.store).unwrap()
        }
    }

    #[test]
    fn test_genesis_is_sink_and_blue() {
        let mut harness = Harness::new(18);
        let change = harness.add(1, &[]);
        assert_eq!(change.sink, h(1));
        assert_eq!(change.previous, None);
        assert_eq!(harness.virtual_processor.sink(), Some(h(1)));
        assert_eq!(harness.virtual_processor.color(&h(1)), Some(BlockColor::Blue));
        assert_eq!(harness.virtual_processor.virtual_blue_score(), Some(1));
    }

    #[test]
    fn test_chain_extension() {
        let mut harness = Harness::new(18);
        harness.add(1, &[]);
        harness.add(2, &[1]);
        let change = harness.add(3, &[2]);

        assert_eq!(change.previous, Some(h(2)));
        assert_eq!(change.added, 1);
        assert!(!change.is_reorg());
        let chain: Vec<Hash> = harness.virtual_processor.chain().copied().collect();
        assert_eq!(chain, vec![h(1), h(2), h(3)]);
        assert_eq!(harness.virtual_processor.colored_len(), 3);
    }

    #[test]
    fn test_sink_moves_to_heavier_branch() {
        let mut harness = Harness::new(0);
        harness.add(1, &[]);
        harness.add(5, &[1]);
        assert_eq!(harness.virtual_processor.sink(), Some(h(5)));

        // Same score as 5 but smaller hash takes over
        let change = harness.add(2, &[1]);
        assert_eq!(change.sink, h(2));
        assert!(change.is_reorg());
        assert_eq!(change.previous, Some(h(5)));
        assert_eq!(harness.virtual_processor.color(&h(5)), Some(BlockColor::Red));
        assert_eq!(harness.virtual_processor.color(&h(2)), Some(BlockColor::Blue));

        harness.add(6, &[5]);
        assert_eq!(harness.virtual_processor.sink(), Some(h(6)));
        assert_eq!(harness.virtual_processor.color(&h(5)), Some(BlockColor::Blue));
        assert_eq!(harness.virtual_processor.color(&h(2)), Some(BlockColor::Red));
        assert!(harness.virtual_processor.is_chain_block(&h(5), 1));
    }

    #[test]
    fn test_every_block_is_colored() {
        let mut harness = Harness::new(1);
        harness.add(1, &[]);
        harness.add(2, &[1]);
        harness.add(3, &[1]);
        harness.add(4, &[1]);
        harness.add(5, &[2, 3]);

        for id in 1..=5 {
            assert!(harness.virtual_processor.color(&h(id)).is_some(), "block {} uncolored", id);
        }
        assert_eq!(harness.virtual_processor.colored_len(), 5);
    }
}
