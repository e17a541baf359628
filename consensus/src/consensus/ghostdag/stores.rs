use std::sync::Arc;

use consensus_core::{BlockColor, BlockHashMap, Hash, KType};
use serde::{Deserialize, Serialize};

/// GHOSTDAG consensus data for a single block
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostdagData {
    /// Selected parent's blue score plus the number of mergeset blues
    pub blue_score: u64,

    /// Parent with highest blue score; `None` for genesis
    pub selected_parent: Option<Hash>,

    /// Blue blocks merged by this block, selected parent first
    pub mergeset_blues: Vec<Hash>,

    /// Red blocks merged by this block
    pub mergeset_reds: Vec<Hash>,

    /// Blue anticone sizes of this block's blues, as seen from this block
    pub blues_anticone_sizes: BlockHashMap<KType>,
}

impl GhostdagData {
    pub fn genesis() -> Self {
        Self::default()
    }

    pub fn new_with_selected_parent(selected_parent: Hash) -> Self {
        let mut data = Self { selected_parent: Some(selected_parent), ..Default::default() };
        data.mergeset_blues.push(selected_parent);
        data.blues_anticone_sizes.insert(selected_parent, 0);
        data
    }

    pub(crate) fn add_blue(&mut self, block: Hash, anticone_size: KType, peer_sizes: &BlockHashMap<KType>) {
        self.mergeset_blues.push(block);
        self.blues_anticone_sizes.insert(block, anticone_size);
        for (peer, size) in peer_sizes {
            self.blues_anticone_sizes.insert(*peer, size + 1);
        }
    }

    pub(crate) fn add_red(&mut self, block: Hash) {
        self.mergeset_reds.push(block);
    }

    pub fn is_genesis(&self) -> bool {
        self.selected_parent.is_none()
    }

    pub fn mergeset_size(&self) -> usize {
        self.mergeset_blues.len() + self.mergeset_reds.len()
    }

    /// Merged blocks with the color this block assigned them.
    pub fn mergeset_colors(&self) -> impl Iterator<Item = (Hash, BlockColor)> + '_ {
        self.mergeset_blues
            .iter()
            .map(|h| (*h, BlockColor::Blue))
            .chain(self.mergeset_reds.iter().map(|h| (*h, BlockColor::Red)))
    }

    pub fn mergeset(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.mergeset_blues.iter().chain(self.mergeset_reds.iter())
    }
}

/// GHOSTDAG data of every colored block. Entries are written once per block.
#[derive(Default)]
pub struct GhostdagStore {
    data: BlockHashMap<Arc<GhostdagData>>,
}

impl GhostdagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: Hash, data: Arc<GhostdagData>) {
        self.data.entry(hash).or_insert(data);
    }

    pub fn get(&self, hash: &Hash) -> Option<&Arc<GhostdagData>> {
        self.data.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.data.contains_key(hash)
    }

    pub fn remove(&mut self, hash: &Hash) -> Option<Arc<GhostdagData>> {
        self.data.remove(hash)
    }

    pub fn blue_score(&self, hash: &Hash) -> Option<u64> {
        self.data.get(hash).map(|d| d.blue_score)
    }

    pub fn selected_parent(&self, hash: &Hash) -> Option<Hash> {
        self.data.get(hash).and_then(|d| d.selected_parent)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
