//! Core types shared by the Phoenix blockDAG engine: block records as
//! delivered by a node or indexer, coloring results, configuration and
//! errors.

pub mod block;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ghostdag;

use std::collections::{HashMap, HashSet};

pub use phoenix_hashes::{Hash, HashParseError};

/// Anticone size type used by the k-cluster rule.
pub type KType = u16;

pub type BlockHashMap<T> = HashMap<Hash, T>;
pub type BlockHashSet = HashSet<Hash>;

pub use block::Block;
pub use config::{DagConfig, IngestionMode};
pub use errors::{ConfigError, DagError, DagResult};
pub use ghostdag::{BlockColor, BlockView};
