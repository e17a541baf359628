//! Difficulty adjustment module for consensus
//!
//! This module provides difficulty calculation, retargeting and hash rate
//! estimation over the selected chain.

pub mod manager;
pub mod window;

pub use manager::{block_work, bits_to_target, target_to_bits, DifficultyManager, MiningStats};
pub use window::DifficultyWindow;
