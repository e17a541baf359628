#[cfg(test)]
mod integration_tests {
    use crate::consensus::types::{BlockStatus, EvictionReason};
    use crate::{Block, DagConfig, DagError, Degree, Hash, IngestionMode, PhoenixDag};
    use std::time::{Duration, Instant};

    fn h(id: u64) -> Hash {
        Hash::from_u64_word(id)
    }

    fn block(id: u64, parents: &[u64]) -> Block {
        Block::new(h(id), parents.iter().map(|p| h(*p)).collect(), id * 1_000)
    }

    fn out_of_order(timeout_ms: u64, max_orphans: usize) -> PhoenixDag {
        let mut config = DagConfig::default().with_ingestion_mode(IngestionMode::OutOfOrder);
        config.orphan_timeout_ms = timeout_ms;
        config.max_orphans = max_orphans;
        PhoenixDag::new(config)
    }

    #[test]
    fn test_dag_integration() {
        let dag = PhoenixDag::new(DagConfig::default().with_ingestion_mode(IngestionMode::Strict));
        dag.add_block(block(1, &[])).unwrap();
        dag.add_block(block(2, &[1])).unwrap();
        dag.add_block(block(3, &[1])).unwrap();
        dag.add_block(block(4, &[2, 3])).unwrap();

        // Verify relationships
        assert_eq!(dag.get_parents(&h(4)).unwrap(), vec![h(2), h(3)]);
        assert_eq!(dag.get_children(&h(1)).unwrap(), vec![h(2), h(3)]);
        assert_eq!(dag.degree(&h(1)).unwrap(), Degree { in_degree: 2, out_degree: 0 });
        assert_eq!(dag.degree(&h(4)).unwrap(), Degree { in_degree: 0, out_degree: 2 });
        assert_eq!(dag.tips(), vec![h(4)]);

        // Verify ancestry
        assert!(dag.is_dag_ancestor_of(h(1), h(4)));
        assert!(!dag.is_dag_ancestor_of(h(2), h(3)));
        assert_eq!(dag.anticone(&h(2)).unwrap(), vec![h(3)]);

        let ancestors: Vec<Hash> = dag.get_ancestors(&h(4)).unwrap().map(|b| b.hash).collect();
        assert_eq!(ancestors, vec![h(2), h(3), h(1)]);
    }

    #[test]
    fn test_out_of_order_arrival_matches_in_order() {
        let in_order = out_of_order(60_000, 16);
        for (id, parents) in [(1, &[][..]), (2, &[1][..]), (3, &[1][..]), (4, &[2, 3][..])] {
            in_order.add_block(block(id, parents)).unwrap();
        }

        let reversed = out_of_order(60_000, 16);
        assert!(reversed.add_block(block(4, &[2, 3])).unwrap().is_pending());
        assert!(reversed.add_block(block(3, &[1])).unwrap().is_pending());
        assert!(reversed.add_block(block(2, &[1])).unwrap().is_pending());
        assert_eq!(reversed.pending_count(), 3);

        let result = reversed.add_block(block(1, &[])).unwrap();
        assert_eq!(result.resolved, vec![h(3), h(2), h(4)]);
        assert_eq!(reversed.pending_count(), 0);

        for id in 1..=4 {
            assert_eq!(reversed.blue_score(&h(id)), in_order.blue_score(&h(id)));
            assert_eq!(reversed.color(&h(id)), in_order.color(&h(id)));
        }
        assert_eq!(reversed.sink(), in_order.sink());
    }

    #[test]
    fn test_orphan_timeout_reports_orphan_block() {
        let dag = out_of_order(100, 16);
        let start = Instant::now();
        dag.add_block_at(block(1, &[]), start).unwrap();
        dag.add_block_at(block(5, &[4]), start).unwrap();
        dag.add_block_at(block(6, &[5]), start).unwrap();

        assert_eq!(dag.evict_expired_orphans_at(start + Duration::from_millis(50)), 0);
        assert_eq!(dag.evict_expired_orphans_at(start + Duration::from_millis(101)), 2);

        let reports = dag.drain_orphan_reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].reason, EvictionReason::Expired);
        let err: DagError = reports[0].clone().into();
        assert_eq!(err, DagError::OrphanBlock { block: h(5), missing: vec![h(4)] });
        assert_eq!(reports[1].hash, h(6));
        assert!(dag.drain_orphan_reports().is_empty());

        // Never indexed, so never colored
        assert!(!dag.contains(&h(5)));
        assert_eq!(dag.is_blue_block(&h(5)), Err(DagError::UnknownBlock(h(5))));
    }

    #[test]
    fn test_pending_block_is_not_queryable() {
        let dag = out_of_order(60_000, 16);
        dag.add_block(block(1, &[])).unwrap();
        dag.add_block(block(3, &[2])).unwrap();

        assert!(dag.is_pending(&h(3)));
        assert_eq!(dag.is_red_block(&h(3)), Err(DagError::UnknownBlock(h(3))));
        assert!(dag.traverse_dag(&h(3)).is_err());
        assert_eq!(dag.tips(), vec![h(1)]);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let dag = out_of_order(60_000, 16);
        dag.add_block(block(1, &[])).unwrap();

        assert_eq!(dag.add_block(block(2, &[1, 2])), Err(DagError::CyclicReference { block: h(2), via: h(2) }));

        dag.add_block(block(3, &[4])).unwrap();
        dag.add_block(block(4, &[5])).unwrap();
        assert_eq!(dag.add_block(block(5, &[3])), Err(DagError::CyclicReference { block: h(5), via: h(3) }));
        assert_eq!(dag.pending_count(), 2);
        assert_eq!(dag.len(), 1);
    }

    #[test]
    fn test_add_block_is_idempotent() {
        let dag = out_of_order(60_000, 16);
        dag.add_block(block(1, &[])).unwrap();
        dag.add_block(block(2, &[1])).unwrap();
        let views = dag.block_views();

        let result = dag.add_block(block(2, &[1])).unwrap();
        assert_eq!(result.status, BlockStatus::Duplicate);
        assert_eq!(dag.block_views(), views);
        assert_eq!(dag.get_children(&h(1)).unwrap(), vec![h(2)]);
    }

    #[test]
    fn test_rejected_blocks_leave_state_unchanged() {
        let dag = PhoenixDag::new(DagConfig::default().with_ingestion_mode(IngestionMode::Strict));
        dag.add_block(block(1, &[])).unwrap();
        dag.add_block(block(2, &[1])).unwrap();
        let views = dag.block_views();
        let tips = dag.tips();

        assert!(dag.add_block(block(3, &[9])).is_err());
        assert!(dag.add_block(block(4, &[2, 2])).is_err());
        assert!(dag.add_block(block(5, &[])).is_err());

        assert_eq!(dag.block_views(), views);
        assert_eq!(dag.tips(), tips);
        assert_eq!(dag.sink(), Some(h(2)));
        assert_eq!(dag.pending_count(), 0);
    }

    #[test]
    fn test_capacity_eviction_cascades() {
        let dag = out_of_order(60_000, 2);
        dag.add_block(block(1, &[])).unwrap();
        dag.add_block(block(3, &[2])).unwrap();
        dag.add_block(block(4, &[3])).unwrap();
        dag.add_block(block(7, &[6])).unwrap();

        // 3 was oldest; 4 waited on it
        let reports = dag.drain_orphan_reports();
        let evicted: Vec<(Hash, EvictionReason)> = reports.iter().map(|r| (r.hash, r.reason)).collect();
        assert_eq!(evicted, vec![(h(3), EvictionReason::Capacity), (h(4), EvictionReason::ParentEvicted)]);
        assert_eq!(dag.pending_count(), 1);
        assert!(dag.is_pending(&h(7)));
    }
}
