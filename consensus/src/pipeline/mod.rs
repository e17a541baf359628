//! Block processing pipeline for consensus
//!
//! This module provides the block processing pipeline that orchestrates
//! validation, the pending pool, GHOSTDAG calculation and virtual recoloring.

pub mod block_processor;
pub mod deps_manager;
pub mod virtual_processor;

pub use block_processor::BlockProcessor;
pub use deps_manager::DepsManager;
pub use virtual_processor::VirtualProcessor;
