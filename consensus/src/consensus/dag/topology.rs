use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use consensus_core::Hash;

use super::reachability::ReachabilityService;
use super::relations::BlockRelations;
use crate::consensus::ghostdag::GhostdagStore;

/// Walk state for a reverse-topological traversal of a block's past.
///
/// Blocks come out by descending blue score, ties broken by the smallest
/// hash. Children always precede their parents since a block outscores every
/// parent. The frontier only holds hashes, so it can be driven against
/// whichever view of the DAG the caller holds.
#[derive(Clone, Debug)]
pub struct TraversalFrontier {
    start: (u64, Hash),
    queue: BinaryHeap<(u64, Reverse<Hash>)>,
    visited: HashSet<Hash>,
}

impl TraversalFrontier {
    pub fn new(start: Hash, blue_score: u64) -> Self {
        let mut frontier =
            Self { start: (blue_score, start), queue: BinaryHeap::new(), visited: HashSet::new() };
        frontier.restart();
        frontier
    }

    pub fn restart(&mut self) {
        let (score, hash) = self.start;
        self.queue.clear();
        self.visited.clear();
        self.visited.insert(hash);
        self.queue.push((score, Reverse(hash)));
    }

    pub fn start(&self) -> Hash {
        self.start.1
    }

    pub fn next_hash(&mut self, relations: &BlockRelations, store: &GhostdagStore) -> Option<Hash> {
        let (_, Reverse(hash)) = self.queue.pop()?;
        for parent in relations.get_parents(&hash).unwrap_or_default() {
            if self.visited.insert(*parent) {
                let score = store.blue_score(parent).unwrap_or_default();
                self.queue.push((score, Reverse(*parent)));
            }
        }
        Some(hash)
    }
}

/// Borrowed traversal over a locked DAG view.
pub struct Ancestors<'a> {
    relations: &'a BlockRelations,
    store: &'a GhostdagStore,
    frontier: TraversalFrontier,
}

impl Iterator for Ancestors<'_> {
    type Item = Hash;

    fn next(&mut self) -> Option<Hash> {
        self.frontier.next_hash(self.relations, self.store)
    }
}

/// Topology queries (traversal, selected chain, anticone) over a DAG view.
pub struct DagTopology<'a> {
    relations: &'a BlockRelations,
    store: &'a GhostdagStore,
}

impl<'a> DagTopology<'a> {
    pub fn new(relations: &'a BlockRelations, store: &'a GhostdagStore) -> Self {
        Self { relations, store }
    }

    /// `from` followed by its whole past, children before parents.
    /// Empty if `from` is not indexed.
    pub fn traverse(&self, from: Hash) -> Ancestors<'a> {
        let mut frontier = TraversalFrontier::new(from, self.store.blue_score(&from).unwrap_or_default());
        if !self.relations.contains(&from) {
            frontier.queue.clear();
        }
        Ancestors { relations: self.relations, store: self.store, frontier }
    }

    /// Past of `from` including itself, parents before children.
    pub fn topological_sort(&self, from: Hash) -> Vec<Hash> {
        let mut order: Vec<Hash> = self.traverse(from).collect();
        order.reverse();
        order
    }

    /// Selected chain from `tip` back to genesis, tip first.
    pub fn selected_chain(&self, tip: Hash) -> Vec<Hash> {
        let mut chain = vec![];
        let mut current = Some(tip);
        while let Some(hash) = current {
            if !self.store.contains(&hash) {
                break;
            }
            chain.push(hash);
            current = self.store.selected_parent(&hash);
        }
        chain
    }

    /// Every indexed block that is neither in the past nor in the future of `hash`.
    pub fn anticone(&self, hash: Hash) -> Vec<Hash> {
        let reach = ReachabilityService::new(self.relations, self.store);
        let mut anticone: Vec<Hash> =
            self.relations.blocks().map(|b| b.hash).filter(|other| reach.is_in_anticone(hash, *other)).collect();
        anticone.sort();
        anticone
    }
}
