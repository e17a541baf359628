use std::collections::HashSet;

use consensus_core::Hash;

use super::relations::BlockRelations;
use crate::consensus::ghostdag::GhostdagStore;

/// Ancestry queries over the indexed DAG.
///
/// Answers by walking parents from the descendant. A block's blue score is
/// strictly greater than each of its parents', so branches whose score drops
/// to the candidate ancestor's score or below are cut.
pub struct ReachabilityService<'a> {
    relations: &'a BlockRelations,
    store: &'a GhostdagStore,
}

impl<'a> ReachabilityService<'a> {
    pub fn new(relations: &'a BlockRelations, store: &'a GhostdagStore) -> Self {
        Self { relations, store }
    }

    /// Strict ancestry: a block is not its own ancestor.
    pub fn is_dag_ancestor_of(&self, ancestor: Hash, descendant: Hash) -> bool {
        if ancestor == descendant {
            return false;
        }
        let Some(floor) = self.store.blue_score(&ancestor) else {
            return false;
        };

        let mut visited = HashSet::new();
        let mut stack: Vec<Hash> = match self.relations.get_parents(&descendant) {
            Some(parents) => parents.to_vec(),
            None => return false,
        };

        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if self.store.blue_score(&current).map_or(false, |score| score <= floor) {
                continue;
            }
            if let Some(parents) = self.relations.get_parents(&current) {
                stack.extend_from_slice(parents);
            }
        }

        false
    }

    pub fn is_dag_ancestor_of_or_equal(&self, ancestor: Hash, descendant: Hash) -> bool {
        ancestor == descendant || self.is_dag_ancestor_of(ancestor, descendant)
    }

    /// Neither ancestor nor descendant of each other.
    pub fn is_in_anticone(&self, a: Hash, b: Hash) -> bool {
        a != b && !self.is_dag_ancestor_of(a, b) && !self.is_dag_ancestor_of(b, a)
    }
}
