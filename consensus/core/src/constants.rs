use crate::KType;

/// GhostDAG K parameter - maximum number of blue blocks in a blue block's anticone
pub const GHOSTDAG_K: KType = 18;

/// Target time per block in milliseconds
pub const TARGET_TIME_PER_BLOCK_MS: u64 = 1_000;

/// Number of selected chain blocks used for difficulty statistics
pub const DIFFICULTY_WINDOW: usize = 144;

/// Minimum difficulty bits (maximum target)
pub const MIN_DIFFICULTY_BITS: u32 = 0x1f00_ffff;

/// Devnet minimum difficulty bits
pub const DEVNET_MIN_DIFFICULTY_BITS: u32 = 0x207f_ffff;

/// How long a block may wait for missing parents before it is evicted
pub const ORPHAN_TIMEOUT_MS: u64 = 60_000;

/// Maximum number of blocks held waiting for parents
pub const MAX_ORPHANS: usize = 1_024;
