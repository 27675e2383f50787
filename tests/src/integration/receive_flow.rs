//! Receive orchestration against a ledger that checks every block.

#[cfg(test)]
mod tests {
    use crate::fixtures::{keypair, orchestrator_config, Harness};
    use nm_03_block_orchestrator::{OperationError, OrchestratorConfig, ReceiveOutcome};
    use shared_types::{BlockHash, BlockSubtype, Raw};

    #[tokio::test]
    async fn test_new_account_opens_on_first_receive() {
        let h = Harness::new();
        let keys = keypair(1);
        let account = keys.account();
        h.fund(&keys, 1_000);

        let report = h
            .orchestrator
            .receive_all_pending(&account.encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 1);
        assert_eq!(report.final_balance, Raw::new(1_000));
        assert_eq!(h.node.balance_of(&account), Raw::new(1_000));
        assert_eq!(h.node.frontier_of(&account), Some(report.frontier));

        let accepted = h.node.accepted();
        assert_eq!(accepted.len(), 1);
        let (block, subtype, _) = &accepted[0];
        assert_eq!(*subtype, BlockSubtype::Open);
        assert!(block.previous.is_zero());
        // No configured representative: the account represents itself.
        assert_eq!(block.representative, account);
    }

    #[tokio::test]
    async fn test_pending_blocks_chain_in_order() {
        let h = Harness::new();
        let keys = keypair(2);
        let account = keys.account();
        h.fund(&keys, 100);
        h.fund(&keys, 200);
        h.fund(&keys, 300);

        let report = h
            .orchestrator
            .receive_all_pending(&account.encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 3);
        assert_eq!(report.total_received(), Raw::new(600));
        assert_eq!(h.node.balance_of(&account), Raw::new(600));
        assert_eq!(h.node.receivable_count(&account), 0);

        let accepted = h.node.accepted();
        let subtypes: Vec<_> = accepted.iter().map(|(_, s, _)| *s).collect();
        assert_eq!(
            subtypes,
            vec![BlockSubtype::Open, BlockSubtype::Receive, BlockSubtype::Receive]
        );
        let mut previous = BlockHash::ZERO;
        for (block, _, hash) in &accepted {
            assert_eq!(block.previous, previous);
            previous = *hash;
        }
        assert_eq!(report.frontier, previous);
    }

    #[tokio::test]
    async fn test_one_rejected_block_does_not_stop_the_rest() {
        let h = Harness::new();
        let keys = keypair(3);
        let account = keys.account();
        h.fund(&keys, 10);
        h.fund(&keys, 20);
        h.fund(&keys, 30);
        h.node.reject_next("Unreceivable");

        let report = h
            .orchestrator
            .receive_all_pending(&account.encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.received_count(), 2);
        let failed = report
            .outcomes
            .iter()
            .find_map(|o| match o {
                ReceiveOutcome::Failed { amount, error, .. } => Some((*amount, error.clone())),
                ReceiveOutcome::Received(_) => None,
            })
            .unwrap();
        assert!(matches!(failed.1, OperationError::BlockRejected { .. }));
        assert_eq!(
            h.node.balance_of(&account),
            Raw::new(60 - failed.0.as_u128())
        );
        assert_eq!(h.node.receivable_count(&account), 1);

        // The skipped block is still there for the next run.
        let retry = h
            .orchestrator
            .receive_all_pending(&account.encode(), &Harness::private_key(&keys))
            .await
            .unwrap();
        assert_eq!(retry.received_count(), 1);
        assert_eq!(h.node.balance_of(&account), Raw::new(60));
    }

    #[tokio::test]
    async fn test_insufficient_work_rebuilds_and_succeeds() {
        let h = Harness::new();
        let keys = keypair(4);
        h.fund(&keys, 5);
        h.node.reject_next("Block work is less than threshold");

        let report = h
            .orchestrator
            .receive_all_pending(&keys.account().encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 1);
        assert_eq!(h.node.calls("process"), 2);
    }

    #[tokio::test]
    async fn test_lagging_reads_are_waited_out() {
        let h = Harness::new();
        let keys = keypair(5);
        h.fund(&keys, 1);
        h.fund(&keys, 2);
        h.node.lag_reads(2);

        let report = h
            .orchestrator
            .receive_all_pending(&keys.account().encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 2);
        assert_eq!(h.node.balance_of(&keys.account()), Raw::new(3));
    }

    #[tokio::test]
    async fn test_unconverged_frontier_fails_the_remaining_blocks() {
        let h = Harness::builder()
            .orchestrator(OrchestratorConfig {
                frontier_refresh_attempts: 2,
                ..orchestrator_config()
            })
            .build();
        let keys = keypair(6);
        h.fund(&keys, 1);
        h.fund(&keys, 2);
        h.fund(&keys, 3);
        h.node.lag_reads(10);

        let report = h
            .orchestrator
            .receive_all_pending(&keys.account().encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 1);
        assert_eq!(report.failed_count(), 2);
        for outcome in &report.outcomes[1..] {
            assert!(matches!(
                outcome,
                ReceiveOutcome::Failed {
                    error: OperationError::StaleFrontier { .. },
                    ..
                }
            ));
        }
        assert_eq!(h.node.accepted().len(), 1);
        assert_eq!(h.node.frontier_of(&keys.account()), Some(report.frontier));
    }

    #[tokio::test]
    async fn test_wrong_key_touches_nothing() {
        let h = Harness::new();
        let owner = keypair(7);
        h.fund(&owner, 9);

        let err = h
            .orchestrator
            .receive_all_pending(&owner.account().encode(), &Harness::private_key(&keypair(8)))
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::KeyMismatch { .. }));
        assert_eq!(h.node.calls("account_info"), 0);
        assert_eq!(h.node.calls("process"), 0);
    }

    #[tokio::test]
    async fn test_initialize_account() {
        let h = Harness::new();
        let keys = keypair(9);
        let address = keys.account().encode();
        let key = Harness::private_key(&keys);

        let err = h.orchestrator.initialize_account(&address, &key).await.unwrap_err();
        assert!(matches!(err, OperationError::AccountNotInitialized { .. }));

        h.fund(&keys, 50);
        let opened = h.orchestrator.initialize_account(&address, &key).await.unwrap();
        assert!(opened.opened);
        assert!(!opened.already_opened);

        let again = h.orchestrator.initialize_account(&address, &key).await.unwrap();
        assert!(again.already_opened);
        assert!(again.report.is_none());
        assert_eq!(h.node.accepted().len(), 1);
    }

    #[tokio::test]
    async fn test_lost_receive_reply_is_not_reported_as_failed() {
        let h = Harness::builder()
            .flaky(|c| c.lose_reply("process", 1))
            .build();
        let keys = keypair(40);
        h.fund(&keys, 500);

        let report = h
            .orchestrator
            .receive_all_pending(&keys.account().encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 1);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.final_balance, Raw::new(500));
        assert_eq!(h.node.accepted().len(), 1);
        assert_eq!(h.node.frontier_of(&keys.account()), Some(report.frontier));
    }
}
