//! Confirmation counting along a selected chain

use consensus_core::{DagError, DagResult, Hash};

use crate::consensus::ghostdag::GhostdagStore;

/// Counts blue blocks above a target in the blue set of a tip.
pub struct ConfirmationCalculator<'a> {
    store: &'a GhostdagStore,
}

impl<'a> ConfirmationCalculator<'a> {
    pub fn new(store: &'a GhostdagStore) -> Self {
        Self { store }
    }

    /// Number of blues in `tip`'s blue set whose blue score exceeds the
    /// target's. Zero when the target is red in that set or outside
    /// `tip`'s past.
    ///
    /// Walks the selected chain of `tip` down to the target's blue score.
    /// Nothing below that score can outscore the target, and the target, if
    /// it is in the past of `tip`, is either a chain block or merged by one
    /// above it.
    pub fn confirmations(&self, tip: Hash, target: Hash) -> DagResult<u64> {
        let target_score = self.store.blue_score(&target).ok_or(DagError::UnknownBlock(target))?;
        if !self.store.contains(&tip) {
            return Err(DagError::UnknownBlock(tip));
        }

        let mut count = 0u64;
        let mut found = false;
        let mut current = tip;
        loop {
            if current == target {
                found = true;
                break;
            }
            let data = self.store.get(&current).ok_or(DagError::UnknownBlock(current))?;
            if data.blue_score <= target_score {
                break;
            }
            if data.mergeset_reds.contains(&target) {
                return Ok(0);
            }

            count += 1;
            // First blue is the selected parent, counted as a chain block
            for blue in data.mergeset_blues.iter().skip(1) {
                if *blue == target {
                    found = true;
                } else if self.store.blue_score(blue).ok_or(DagError::UnknownBlock(*blue))? > target_score {
                    count += 1;
                }
            }

            match data.selected_parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(if found { count } else { 0 })
    }
}
