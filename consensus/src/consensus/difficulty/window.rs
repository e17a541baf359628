//! Difficulty window management
//!
//! This module keeps a sliding window of selected chain blocks for
//! difficulty and hash rate calculations.

use consensus_core::{Block, Hash};
use std::collections::VecDeque;

/// Difficulty window for adjustment calculations
#[derive(Clone, Debug)]
pub struct DifficultyWindow {
    window_size: usize,
    blocks: VecDeque<(Hash, u64, u32)>, // (hash, timestamp, bits)
}

impl DifficultyWindow {
    /// Create a new difficulty window
    pub fn new(window_size: usize) -> Self {
        Self { window_size, blocks: VecDeque::with_capacity(window_size) }
    }

    /// Window over the last `window_size` blocks of a chain given oldest first
    pub fn from_chain<'a>(window_size: usize, chain: impl IntoIterator<Item = &'a Block>) -> Self {
        let mut window = Self::new(window_size);
        for block in chain {
            window.add_block(block);
        }
        window
    }

    /// Add a block to the window
    pub fn add_block(&mut self, block: &Block) {
        if self.window_size == 0 {
            return;
        }
        if self.blocks.len() >= self.window_size {
            self.blocks.pop_front();
        }
        self.blocks.push_back((block.hash, block.timestamp, block.bits));
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Get the number of blocks in the window
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if the window is full
    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.window_size
    }

    pub fn hashes(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.blocks.iter().map(|(hash, _, _)| hash)
    }

    /// Get bits from the window
    pub fn bits(&self) -> Vec<u32> {
        self.blocks.iter().map(|(_, _, bits)| *bits).collect()
    }

    /// Bits of the newest block
    pub fn last_bits(&self) -> Option<u32> {
        self.blocks.back().map(|(_, _, bits)| *bits)
    }

    /// Get the first timestamp in the window
    pub fn first_timestamp(&self) -> Option<u64> {
        self.blocks.front().map(|(_, timestamp, _)| *timestamp)
    }

    /// Get the last timestamp in the window
    pub fn last_timestamp(&self) -> Option<u64> {
        self.blocks.back().map(|(_, timestamp, _)| *timestamp)
    }

    /// Calculate time span of the window
    pub fn time_span(&self) -> Option<u64> {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => {
                if last > first {
                    Some(last - first)
                } else {
                    Some(1) // Minimum 1ms to avoid division by zero
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: u64, timestamp: u64) -> Block {
        Block::new(Hash::from_u64_word(id), vec![], timestamp).with_bits(0x1f00ffff)
    }

    #[test]
    fn test_window_add_block() {
        let mut window = DifficultyWindow::new(10);
        window.add_block(&block(1, 1000));
        assert_eq!(window.len(), 1);
        assert_eq!(window.last_bits(), Some(0x1f00ffff));
    }

    #[test]
    fn test_window_size_limit() {
        let blocks: Vec<Block> = (0..5).map(|i| block(i, 1000 + i * 1000)).collect();
        let window = DifficultyWindow::from_chain(3, &blocks);
        assert_eq!(window.len(), 3);
        assert!(window.is_full());
        assert_eq!(window.first_timestamp(), Some(3000));
        assert_eq!(window.hashes().next(), Some(&Hash::from_u64_word(2)));
    }

    #[test]
    fn test_time_span() {
        let mut window = DifficultyWindow::new(10);
        assert_eq!(window.time_span(), None);
        window.add_block(&block(1, 1000));
        window.add_block(&block(2, 2000));
        assert_eq!(window.time_span(), Some(1000));
    }

    #[test]
    fn test_time_span_never_zero() {
        let window = DifficultyWindow::from_chain(4, &[block(1, 5000), block(2, 5000)]);
        assert_eq!(window.time_span(), Some(1));
    }
}
