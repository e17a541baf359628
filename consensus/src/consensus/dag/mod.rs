//! DAG indexing for the Phoenix blockDAG
//!
//! This module provides:
//! - Block relationship tracking (parents/children, degrees, tips)
//! - Ancestry queries
//! - Topology operations (reverse-topological traversal, selected chain, anticone)

pub mod relations;
pub mod reachability;
pub mod topology;
#[cfg(test)]
mod integration_test;

pub use relations::{BlockRelations, Degree};
pub use reachability::ReachabilityService;
pub use topology::{Ancestors, DagTopology, TraversalFrontier};
