//! Ingestion run and the JSON report handed to the rendering layer

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use consensus::{Block, BlockView, DagConfig, Hash, MiningStats, OrphanReport, PhoenixDag};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedBlock {
    pub hash: Hash,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationsEntry {
    pub hash: Hash,
    pub confirmations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub sink: Option<Hash>,
    pub virtual_blue_score: Option<u64>,
    pub blocks: Vec<BlockView>,
    pub stats: MiningStats,
    /// Pending blocks evicted during the run
    pub orphans: Vec<OrphanReport>,
    /// Blocks still waiting for parents at the end of the run
    pub pending: Vec<Hash>,
    pub rejected: Vec<RejectedBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<ConfirmationsEntry>,
}

/// Read a JSON array of block records
pub fn load_blocks(path: &Path) -> Result<Vec<Block>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read blocks file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse blocks file {}", path.display()))
}

/// Ingest `blocks` in order and build the report. Rejected blocks are
/// recorded rather than aborting the run.
pub fn run(config: DagConfig, blocks: Vec<Block>, confirmations_of: Option<Hash>) -> Result<Report> {
    let dag = PhoenixDag::new(config);
    let mut rejected = Vec::new();

    for block in blocks {
        let hash = block.hash;
        match dag.add_block(block) {
            Ok(result) => debug!("Block {} -> {:?}", hash, result.status),
            Err(e) => {
                warn!("Block {} rejected: {}", hash, e);
                rejected.push(RejectedBlock { hash, error: e.to_string() });
            }
        }
    }

    let confirmations = match confirmations_of {
        Some(hash) => {
            let confirmations = dag
                .get_confirmations(&hash)
                .with_context(|| format!("Cannot count confirmations of {}", hash))?;
            Some(ConfirmationsEntry { hash, confirmations })
        }
        None => None,
    };

    let report = Report {
        sink: dag.sink(),
        virtual_blue_score: dag.virtual_blue_score(),
        blocks: dag.block_views(),
        stats: dag.mining_stats(),
        orphans: dag.drain_orphan_reports(),
        pending: dag.pending_blocks(),
        rejected,
        confirmations,
    };
    info!(
        "Indexed {} blocks, {} pending, {} rejected",
        report.blocks.len(),
        report.pending.len(),
        report.rejected.len()
    );
    Ok(report)
}
