//! Difficulty manager for consensus
//!
//! This module derives difficulty, retarget bits and hash rate estimates
//! from a window of selected chain blocks.

use consensus_core::DagConfig;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::window::DifficultyWindow;

/// Mining statistics over the current difficulty window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStats {
    /// Easiest target divided by the current target
    pub difficulty: f64,
    /// Estimated hashes per second
    pub hash_rate: f64,
    pub average_block_time_ms: f64,
    /// Bits the next block should carry
    pub next_bits: u32,
    pub window_len: usize,
}

/// Difficulty manager for consensus
#[derive(Debug, Clone)]
pub struct DifficultyManager {
    target_time_per_block_ms: u64,
    window_size: usize,
    min_difficulty_bits: u32,
}

impl DifficultyManager {
    pub fn new(target_time_per_block_ms: u64, window_size: usize, min_difficulty_bits: u32) -> Self {
        Self { target_time_per_block_ms, window_size, min_difficulty_bits }
    }

    pub fn from_config(config: &DagConfig) -> Self {
        Self::new(config.target_time_per_block_ms, config.difficulty_window_size, config.min_difficulty_bits)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Bits 0 means the source did not report a target
    pub fn effective_bits(&self, bits: u32) -> u32 {
        if bits == 0 {
            self.min_difficulty_bits
        } else {
            bits
        }
    }

    /// Easiest allowed target
    pub fn max_target(&self) -> U256 {
        bits_to_target(self.min_difficulty_bits)
    }

    /// Retargets the newest block's bits by actual over expected timespan
    pub fn calculate_next_bits(&self, window: &DifficultyWindow) -> u32 {
        let current_bits = self.effective_bits(window.last_bits().unwrap_or(0));

        // Need at least 2 blocks to calculate difficulty
        let Some(time_span) = window.time_span().filter(|_| window.len() >= 2) else {
            return current_bits;
        };
        let target_time_span = self.target_time_per_block_ms.max(1) * (window.len() as u64 - 1);

        let current_target = bits_to_target(current_bits);
        let time_span = U256::from(time_span);
        let target_time_span = U256::from(target_time_span);
        let new_target = match current_target.checked_mul(time_span) {
            Some(scaled) => scaled / target_time_span,
            None => (current_target / target_time_span).saturating_mul(time_span),
        };

        // Clamp to minimum difficulty
        let max_target = self.max_target();
        let clamped_target = if new_target > max_target || new_target.is_zero() { max_target } else { new_target };
        target_to_bits(clamped_target)
    }

    /// `max_target / current_target` for the given bits
    pub fn difficulty(&self, bits: u32) -> f64 {
        let target = bits_to_target(self.effective_bits(bits));
        if target.is_zero() {
            return 0.0;
        }
        u256_to_f64(self.max_target()) / u256_to_f64(target)
    }

    /// Expected work of the window after its first block, per second of
    /// window timespan
    pub fn estimate_hash_rate(&self, window: &DifficultyWindow) -> f64 {
        if window.len() < 2 {
            return 0.0;
        }
        let Some(time_span) = window.time_span() else {
            return 0.0;
        };

        let total_work: f64 =
            window.bits().iter().skip(1).map(|bits| u256_to_f64(block_work(self.effective_bits(*bits)))).sum();
        total_work / (time_span as f64 / 1000.0)
    }

    pub fn average_block_time_ms(&self, window: &DifficultyWindow) -> f64 {
        match window.time_span() {
            Some(span) if window.len() >= 2 => span as f64 / (window.len() - 1) as f64,
            _ => 0.0,
        }
    }

    pub fn mining_stats(&self, window: &DifficultyWindow) -> MiningStats {
        MiningStats {
            difficulty: self.difficulty(window.last_bits().unwrap_or(0)),
            hash_rate: self.estimate_hash_rate(window),
            average_block_time_ms: self.average_block_time_ms(window),
            next_bits: self.calculate_next_bits(window),
            window_len: window.len(),
        }
    }
}

/// Convert compact bits representation to target (U256)
pub fn bits_to_target(bits: u32) -> U256 {
    let size = (bits >> 24) as usize;
    let word = bits & 0x007fffff;

    if size <= 3 {
        U256::from(word >> (8 * (3 - size)))
    } else {
        U256::from(word) << (8 * (size - 3))
    }
}

/// Convert target (U256) to compact bits representation
pub fn target_to_bits(target: U256) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (target >> (8 * (size - 3))).low_u32()
    };

    // The sign bit of the mantissa must stay clear
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    ((size as u32) << 24) | compact
}

/// Expected hashes to find a block under `bits`: 2^256 / (target + 1)
pub fn block_work(bits: u32) -> U256 {
    let target = bits_to_target(bits);
    // 2^256 does not fit; (!target / (target + 1)) + 1 is the same quotient
    match target.checked_add(U256::one()) {
        Some(divisor) => (!target / divisor).saturating_add(U256::one()),
        None => U256::one(),
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.0.iter().rev().fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}
