use std::collections::{HashSet, VecDeque};

use consensus_core::{BlockHashMap, DagError, DagResult, Hash, KType};

use super::stores::{GhostdagData, GhostdagStore};
use crate::consensus::dag::{BlockRelations, ReachabilityService};

enum ColoringState {
    Blue { anticone_size: KType, peer_sizes: BlockHashMap<KType> },
    Red,
}

/// k-cluster coloring of a block's mergeset.
pub struct GhostdagProtocol {
    k: KType,
}

impl GhostdagProtocol {
    pub fn new(k: KType) -> Self {
        Self { k }
    }

    pub fn k(&self) -> KType {
        self.k
    }

    /// Computes GHOSTDAG data for a block (or the virtual block) with the given
    /// parents. Every parent must already be indexed and colored.
    pub fn ghostdag(
        &self,
        relations: &BlockRelations,
        store: &GhostdagStore,
        parents: &[Hash],
    ) -> DagResult<GhostdagData> {
        if parents.is_empty() {
            return Ok(GhostdagData::genesis());
        }

        let selected_parent = self.find_selected_parent(store, parents)?;
        let selected_parent_score = store
            .blue_score(&selected_parent)
            .ok_or(DagError::UnknownBlock(selected_parent))?;

        let reach = ReachabilityService::new(relations, store);
        let mergeset = self.ordered_mergeset_without_selected_parent(&reach, relations, store, selected_parent, parents)?;

        let mut data = GhostdagData::new_with_selected_parent(selected_parent);
        for candidate in mergeset {
            match self.check_blue_candidate(&reach, store, &data, candidate)? {
                ColoringState::Blue { anticone_size, peer_sizes } => {
                    data.add_blue(candidate, anticone_size, &peer_sizes)
                }
                ColoringState::Red => data.add_red(candidate),
            }
        }

        data.blue_score = selected_parent_score + data.mergeset_blues.len() as u64;
        Ok(data)
    }

    /// Highest blue score wins, ties go to the lexicographically smallest hash.
    pub fn find_selected_parent(&self, store: &GhostdagStore, parents: &[Hash]) -> DagResult<Hash> {
        let mut best: Option<(u64, Hash)> = None;
        for parent in parents {
            let score = store.blue_score(parent).ok_or(DagError::UnknownBlock(*parent))?;
            best = match best {
                Some((best_score, best_hash)) if best_score > score || (best_score == score && best_hash < *parent) => {
                    Some((best_score, best_hash))
                }
                _ => Some((score, *parent)),
            };
        }
        best.map(|(_, hash)| hash).ok_or_else(|| DagError::InconsistentColoring("no parents to select from".to_string()))
    }

    /// Blocks in the past of `parents` that are neither the selected parent nor
    /// in its past, ordered by (blue score, hash).
    fn ordered_mergeset_without_selected_parent(
        &self,
        reach: &ReachabilityService<'_>,
        relations: &BlockRelations,
        store: &GhostdagStore,
        selected_parent: Hash,
        parents: &[Hash],
    ) -> DagResult<Vec<Hash>> {
        let mut queue: VecDeque<Hash> = parents.iter().copied().filter(|p| *p != selected_parent).collect();
        let mut visited: HashSet<Hash> = queue.iter().copied().collect();
        visited.insert(selected_parent);

        let mut mergeset = Vec::new();
        while let Some(current) = queue.pop_front() {
            if reach.is_dag_ancestor_of(current, selected_parent) {
                continue;
            }
            let score = store.blue_score(&current).ok_or(DagError::UnknownBlock(current))?;
            mergeset.push((score, current));

            let current_parents = relations.get_parents(&current).ok_or(DagError::UnknownBlock(current))?;
            for parent in current_parents {
                if visited.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
        }

        mergeset.sort();
        Ok(mergeset.into_iter().map(|(_, hash)| hash).collect())
    }

    /// Walks the selected chain of the block being colored and checks that
    /// adding `candidate` keeps every blue anticone within `k`.
    fn check_blue_candidate(
        &self,
        reach: &ReachabilityService<'_>,
        store: &GhostdagStore,
        new_block_data: &GhostdagData,
        candidate: Hash,
    ) -> DagResult<ColoringState> {
        if new_block_data.mergeset_blues.len() as u64 == self.k as u64 + 1 {
            return Ok(ColoringState::Red);
        }

        let mut peer_sizes: BlockHashMap<KType> = BlockHashMap::new();
        let mut anticone_size: KType = 0;

        let mut chain_hash: Option<Hash> = None;
        let mut chain_data: &GhostdagData = new_block_data;
        loop {
            // Once the chain block itself is in the candidate's past, so are all blues below it
            if let Some(hash) = chain_hash {
                if reach.is_dag_ancestor_of(hash, candidate) {
                    break;
                }
            }

            for &blue in &chain_data.mergeset_blues {
                if reach.is_dag_ancestor_of(blue, candidate) {
                    continue;
                }
                let peer_size = self.blue_anticone_size(store, blue, new_block_data)?;
                if peer_size > self.k {
                    return Err(DagError::InconsistentColoring(format!(
                        "blue block {} has anticone size {} above k = {}",
                        blue, peer_size, self.k
                    )));
                }
                peer_sizes.insert(blue, peer_size);

                anticone_size += 1;
                if anticone_size > self.k || peer_size == self.k {
                    return Ok(ColoringState::Red);
                }
            }

            match chain_data.selected_parent {
                Some(parent) => {
                    chain_hash = Some(parent);
                    chain_data = store.get(&parent).ok_or(DagError::UnknownBlock(parent))?;
                }
                None => break,
            }
        }

        Ok(ColoringState::Blue { anticone_size, peer_sizes })
    }

    /// Blue anticone size of `block` as recorded along the selected chain of `context`.
    fn blue_anticone_size(&self, store: &GhostdagStore, block: Hash, context: &GhostdagData) -> DagResult<KType> {
        let mut current = context;
        loop {
            if let Some(size) = current.blues_anticone_sizes.get(&block) {
                return Ok(*size);
            }
            match current.selected_parent {
                Some(parent) => current = store.get(&parent).ok_or(DagError::UnknownBlock(parent))?,
                None => {
                    return Err(DagError::InconsistentColoring(format!(
                        "block {} is not in the blue set of the context chain",
                        block
                    )))
                }
            }
        }
    }
}
