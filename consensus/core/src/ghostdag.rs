use serde::{Deserialize, Serialize};

use crate::Hash;

/// Coloring outcome for a block relative to a tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    /// Counted toward consensus weight
    Blue,
    /// Known but excluded from the blue set
    Red,
}

impl BlockColor {
    pub fn is_blue(self) -> bool {
        matches!(self, BlockColor::Blue)
    }

    pub fn is_red(self) -> bool {
        matches!(self, BlockColor::Red)
    }
}

/// Record handed to the DAG visualization layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub hash: Hash,
    pub parent_hashes: Vec<Hash>,
    /// Computed blue score (not the one declared by the source)
    pub blue_score: u64,
    pub is_canonical: bool,
}
