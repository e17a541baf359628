//! Dependency manager for orphan block handling
//!
//! This module holds blocks whose parents are not indexed yet and releases
//! them once every missing parent has been accepted.

use consensus_core::{Block, BlockHashMap, BlockHashSet, Hash};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::consensus::types::{EvictionReason, OrphanReport};

/// A pending block and the parents it is still waiting for
#[derive(Debug, Clone)]
pub struct OrphanEntry {
    pub block: Block,
    pub missing: BlockHashSet,
    pub received_at: Instant,
    seq: u64,
}

/// Dependency manager for orphan blocks
#[derive(Default)]
pub struct DepsManager {
    /// Orphan blocks indexed by their hash
    orphans: BlockHashMap<OrphanEntry>,
    /// Pending blocks waiting on a given parent hash
    waiting_for_parents: BlockHashMap<Vec<Hash>>,
    /// Arrival order, oldest first
    arrival: BTreeMap<u64, Hash>,
    next_seq: u64,
}

impl DepsManager {
    /// Create a new dependency manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an orphan block waiting on `missing` parents
    pub fn add_orphan(&mut self, block: Block, missing: Vec<Hash>, now: Instant) {
        let hash = block.hash;
        if self.orphans.contains_key(&hash) {
            return;
        }

        for parent in &missing {
            self.waiting_for_parents.entry(*parent).or_default().push(hash);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.arrival.insert(seq, hash);
        self.orphans.insert(hash, OrphanEntry { block, missing: missing.into_iter().collect(), received_at: now, seq });
    }

    /// Check if a block is an orphan
    pub fn is_orphan(&self, hash: &Hash) -> bool {
        self.orphans.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&OrphanEntry> {
        self.orphans.get(hash)
    }

    /// Parents `hash` is still waiting for, sorted
    pub fn missing_parents(&self, hash: &Hash) -> Option<Vec<Hash>> {
        self.orphans.get(hash).map(|entry| sorted(entry.missing.iter().copied()))
    }

    /// Pending blocks waiting directly on `parent`
    pub fn get_blocks_waiting_for(&self, parent: &Hash) -> Vec<Hash> {
        self.waiting_for_parents.get(parent).cloned().unwrap_or_default()
    }

    /// Pending hashes, oldest first
    pub fn hashes(&self) -> Vec<Hash> {
        self.arrival.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Returns the missing parent through which `hash` would end up waiting
    /// on itself, following the missing-parent edges of pending blocks.
    pub fn would_cycle(&self, hash: Hash, missing: &[Hash]) -> Option<Hash> {
        for &via in missing {
            let mut visited = BlockHashSet::new();
            let mut stack = vec![via];
            while let Some(current) = stack.pop() {
                if current == hash {
                    return Some(via);
                }
                if !visited.insert(current) {
                    continue;
                }
                if let Some(entry) = self.orphans.get(&current) {
                    stack.extend(entry.missing.iter().copied());
                }
            }
        }
        None
    }

    /// Marks `parent` as indexed. Returns the pending blocks that no longer
    /// miss anything, in arrival order, and drops them from the pool.
    pub fn resolve(&mut self, parent: &Hash) -> Vec<Block> {
        let Some(dependents) = self.waiting_for_parents.remove(parent) else {
            return Vec::new();
        };

        let mut ready = Vec::new();
        for dependent in dependents {
            let Some(entry) = self.orphans.get_mut(&dependent) else {
                continue;
            };
            entry.missing.remove(parent);
            if entry.missing.is_empty() {
                ready.push((entry.seq, dependent));
            }
        }
        ready.sort_unstable();

        ready
            .into_iter()
            .filter_map(|(_, hash)| self.remove_entry(&hash))
            .map(|entry| entry.block)
            .collect()
    }

    /// Evicts blocks pending for longer than `timeout`, plus everything
    /// waiting on them.
    pub fn evict_expired(&mut self, now: Instant, timeout: Duration) -> Vec<OrphanReport> {
        let expired: Vec<Hash> = self
            .arrival
            .values()
            .filter(|hash| {
                self.orphans
                    .get(*hash)
                    .map_or(false, |entry| now.saturating_duration_since(entry.received_at) > timeout)
            })
            .copied()
            .collect();

        let mut reports = Vec::new();
        for hash in expired {
            if self.orphans.contains_key(&hash) {
                reports.extend(self.evict(hash, EvictionReason::Expired));
            }
        }
        reports
    }

    /// Evicts the oldest pending block and its dependents.
    pub fn evict_oldest(&mut self) -> Vec<OrphanReport> {
        let Some(oldest) = self.arrival.values().next().copied() else {
            return Vec::new();
        };
        self.evict(oldest, EvictionReason::Capacity)
    }

    /// Evicts every pending block that waits, directly or through other
    /// pending blocks, on `hash`. `hash` itself need not be pending.
    pub fn evict_dependents_of(&mut self, hash: &Hash, reason: EvictionReason) -> Vec<OrphanReport> {
        let mut reports = Vec::new();
        for dependent in self.waiting_for_parents.remove(hash).unwrap_or_default() {
            if self.orphans.contains_key(&dependent) {
                reports.extend(self.evict(dependent, reason));
            }
        }
        reports
    }

    fn evict(&mut self, hash: Hash, reason: EvictionReason) -> Vec<OrphanReport> {
        let mut reports = Vec::new();
        let mut stack = vec![(hash, reason)];
        while let Some((current, reason)) = stack.pop() {
            let Some(entry) = self.remove_entry(&current) else {
                continue;
            };
            reports.push(OrphanReport { hash: current, missing_parents: sorted(entry.missing.into_iter()), reason });
            for dependent in self.waiting_for_parents.remove(&current).unwrap_or_default() {
                stack.push((dependent, EvictionReason::ParentEvicted));
            }
        }
        reports
    }

    fn remove_entry(&mut self, hash: &Hash) -> Option<OrphanEntry> {
        let entry = self.orphans.remove(hash)?;
        self.arrival.remove(&entry.seq);
        for parent in &entry.missing {
            if let Some(waiting) = self.waiting_for_parents.get_mut(parent) {
                waiting.retain(|h| h != hash);
                if waiting.is_empty() {
                    self.waiting_for_parents.remove(parent);
                }
            }
        }
        Some(entry)
    }
}

fn sorted(hashes: impl Iterator<Item = Hash>) -> Vec<Hash> {
    let mut hashes: Vec<Hash> = hashes.collect();
    hashes.sort();
    hashes
}
