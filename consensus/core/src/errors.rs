use std::path::PathBuf;

use thiserror::Error;

use crate::Hash;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DagError {
    #[error("Unknown block {0}")]
    UnknownBlock(Hash),

    #[error("Block {block} references unknown parent {parent}")]
    UnknownParent { block: Hash, parent: Hash },

    #[error("Block {block} evicted while waiting for parents {missing:?}")]
    OrphanBlock { block: Hash, missing: Vec<Hash> },

    #[error("Block {block} would create a cycle through {via}")]
    CyclicReference { block: Hash, via: Hash },

    #[error("Block {block} lists parent {parent} more than once")]
    DuplicateParent { block: Hash, parent: Hash },

    #[error("Block {block} has no parents but genesis {genesis} is already known")]
    MultipleGenesis { block: Hash, genesis: Hash },

    #[error("Inconsistent coloring: {0}")]
    InconsistentColoring(String),
}

pub type DagResult<T> = Result<T, DagError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
