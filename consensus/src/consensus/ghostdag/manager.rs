use std::sync::Arc;

use consensus_core::{BlockColor, BlockHashMap, DagError, DagResult, Hash, KType};

use super::protocol::GhostdagProtocol;
use super::stores::{GhostdagData, GhostdagStore};
use crate::consensus::dag::BlockRelations;

/// Coloring of a tip's past as seen from that tip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlueSet {
    pub tip: Hash,
    pub blue_score: u64,
    pub colors: BlockHashMap<BlockColor>,
}

impl BlueSet {
    pub fn color(&self, hash: &Hash) -> Option<BlockColor> {
        self.colors.get(hash).copied()
    }

    pub fn blues(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.colors.iter().filter(|(_, c)| c.is_blue()).map(|(h, _)| h)
    }

    pub fn reds(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.colors.iter().filter(|(_, c)| c.is_red()).map(|(h, _)| h)
    }
}

pub struct GhostdagManager {
    protocol: GhostdagProtocol,
}

impl GhostdagManager {
    pub fn new(k: KType) -> Self {
        Self { protocol: GhostdagProtocol::new(k) }
    }

    pub fn k(&self) -> KType {
        self.protocol.k()
    }

    pub fn calculate(
        &self,
        relations: &BlockRelations,
        store: &GhostdagStore,
        parents: &[Hash],
    ) -> DagResult<GhostdagData> {
        self.protocol.ghostdag(relations, store, parents)
    }

    /// Colors `tip` and its whole past by walking the selected chain and
    /// collecting each chain block's mergeset.
    pub fn blue_set(&self, store: &GhostdagStore, tip: Hash) -> DagResult<BlueSet> {
        let tip_data = store.get(&tip).ok_or(DagError::UnknownBlock(tip))?;
        let mut colors = BlockHashMap::new();
        colors.insert(tip, BlockColor::Blue);

        let mut current: &Arc<GhostdagData> = tip_data;
        loop {
            for (hash, color) in current.mergeset_colors() {
                colors.insert(hash, color);
            }
            match current.selected_parent {
                Some(parent) => current = store.get(&parent).ok_or(DagError::UnknownBlock(parent))?,
                None => break,
            }
        }

        Ok(BlueSet { tip, blue_score: tip_data.blue_score, colors })
    }

    /// Selected chain of `tip`, tip first, ending at genesis.
    pub fn selected_chain(&self, store: &GhostdagStore, tip: Hash) -> DagResult<Vec<Hash>> {
        store.get(&tip).ok_or(DagError::UnknownBlock(tip))?;
        let mut chain = vec![tip];
        let mut current = tip;
        while let Some(parent) = store.selected_parent(&current) {
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }
}
