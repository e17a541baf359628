use std::collections::BTreeSet;
use std::sync::Arc;

use consensus_core::{Block, BlockHashMap, Hash};

/// Edge counts for a block in the parent graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Degree {
    /// Children referencing this block
    pub in_degree: usize,
    /// Parents this block references
    pub out_degree: usize,
}

/// Parent/child adjacency of every indexed block.
///
/// Callers validate parents before `add_block`; this type only keeps the
/// indexes consistent.
#[derive(Default)]
pub struct BlockRelations {
    blocks: BlockHashMap<Arc<Block>>,
    children: BlockHashMap<Vec<Hash>>,
    degrees: BlockHashMap<Degree>,
    tips: BTreeSet<Hash>,
    genesis: Option<Hash>,
}

impl BlockRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Arc<Block>) {
        let hash = block.hash;
        if self.blocks.contains_key(&hash) {
            return;
        }

        for parent in &block.parent_hashes {
            self.children.entry(*parent).or_default().push(hash);
            self.degrees.entry(*parent).or_default().in_degree += 1;
            self.tips.remove(parent);
        }
        if block.is_genesis() {
            self.genesis = Some(hash);
        }

        self.degrees.insert(hash, Degree { in_degree: 0, out_degree: block.parent_hashes.len() });
        self.children.insert(hash, Vec::new());
        self.tips.insert(hash);
        self.blocks.insert(hash, block);
    }

    /// Undo `add_block` for a block nothing references yet.
    pub fn remove_tip(&mut self, hash: &Hash) -> Option<Arc<Block>> {
        if self.children.get(hash).map_or(false, |c| !c.is_empty()) {
            return None;
        }
        let block = self.blocks.remove(hash)?;
        self.children.remove(hash);
        self.degrees.remove(hash);
        self.tips.remove(hash);

        for parent in &block.parent_hashes {
            let mut orphaned = false;
            if let Some(children) = self.children.get_mut(parent) {
                children.retain(|c| c != hash);
                orphaned = children.is_empty();
            }
            if let Some(degree) = self.degrees.get_mut(parent) {
                degree.in_degree = degree.in_degree.saturating_sub(1);
            }
            if orphaned {
                self.tips.insert(*parent);
            }
        }
        if self.genesis == Some(*hash) {
            self.genesis = None;
        }
        Some(block)
    }

    pub fn get(&self, hash: &Hash) -> Option<&Arc<Block>> {
        self.blocks.get(hash)
    }

    pub fn get_parents(&self, hash: &Hash) -> Option<&[Hash]> {
        self.blocks.get(hash).map(|b| b.parent_hashes.as_slice())
    }

    /// Children in the order they were indexed.
    pub fn get_children(&self, hash: &Hash) -> Option<&[Hash]> {
        self.children.get(hash).map(Vec::as_slice)
    }

    pub fn degree(&self, hash: &Hash) -> Option<Degree> {
        self.degrees.get(hash).copied()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Blocks without children, sorted by hash.
    pub fn get_tips(&self) -> Vec<Hash> {
        self.tips.iter().copied().collect()
    }

    pub fn genesis(&self) -> Option<Hash> {
        self.genesis
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }
}
