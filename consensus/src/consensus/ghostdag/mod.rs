//! GHOSTDAG coloring
//!
//! Blue set selection with an anticone bound `k`, selected parent choice and
//! blue score calculation.

pub mod protocol;
pub mod stores;
pub mod manager;

pub use protocol::GhostdagProtocol;
pub use stores::{GhostdagData, GhostdagStore};
pub use manager::{BlueSet, GhostdagManager};
