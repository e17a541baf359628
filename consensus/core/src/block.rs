use serde::{Deserialize, Serialize};

use crate::Hash;

/// A block as observed from the block source (node RPC or indexer).
///
/// Records are immutable once ingested. The declared `blue_score` is kept for
/// display and debugging only; the engine always recomputes scores and colors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub hash: Hash,
    /// Ordered parent references. Empty only for genesis.
    #[serde(default)]
    pub parent_hashes: Vec<Hash>,
    /// Blue score as claimed by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue_score: Option<u64>,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub timestamp: u64,
    /// Compact difficulty target, 0 when the source does not report one
    #[serde(default)]
    pub bits: u32,
}

impl Block {
    pub fn new(hash: Hash, parent_hashes: Vec<Hash>, timestamp: u64) -> Self {
        Self { hash, parent_hashes, blue_score: None, timestamp, bits: 0 }
    }

    pub fn genesis(hash: Hash, timestamp: u64) -> Self {
        Self::new(hash, Vec::new(), timestamp)
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_declared_blue_score(mut self, blue_score: u64) -> Self {
        self.blue_score = Some(blue_score);
        self
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    /// Returns the first parent hash that is listed more than once.
    pub fn repeated_parent(&self) -> Option<Hash> {
        self.parent_hashes
            .iter()
            .enumerate()
            .find(|(i, p)| self.parent_hashes[..*i].contains(p))
            .map(|(_, p)| *p)
    }
}
