//! Send orchestration: receive first, check the balance, publish once.

#[cfg(test)]
mod tests {
    use crate::fixtures::{keypair, Harness};
    use nm_03_block_orchestrator::{OperationError, SendReceipt, SendResult};
    use shared_types::{BlockSubtype, Raw};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_send_then_recipient_receives() {
        let h = Harness::new();
        let sender = keypair(1);
        let recipient = keypair(2);
        h.fund(&sender, 1_000);

        let receipt = h
            .orchestrator
            .send_transaction(
                &sender.account().encode(),
                &recipient.account().encode(),
                "400",
                &Harness::private_key(&sender),
            )
            .await
            .unwrap();

        assert_eq!(receipt.received_first, 1);
        assert_eq!(receipt.previous_balance, Raw::new(1_000));
        assert_eq!(receipt.new_balance, Raw::new(600));
        assert_eq!(h.node.balance_of(&sender.account()), Raw::new(600));
        assert_eq!(h.node.frontier_of(&sender.account()), Some(receipt.hash));
        assert_eq!(h.node.receivable_count(&recipient.account()), 1);

        let report = h
            .orchestrator
            .receive_all_pending(
                &recipient.account().encode(),
                &Harness::private_key(&recipient),
            )
            .await
            .unwrap();
        assert_eq!(report.received_count(), 1);
        assert_eq!(h.node.balance_of(&recipient.account()), Raw::new(400));

        let subtypes: Vec<_> = h.node.accepted().iter().map(|(_, s, _)| *s).collect();
        assert_eq!(
            subtypes,
            vec![BlockSubtype::Open, BlockSubtype::Send, BlockSubtype::Open]
        );
    }

    #[tokio::test]
    async fn test_insufficient_balance_publishes_nothing() {
        let h = Harness::new();
        let sender = keypair(3);
        h.fund(&sender, 100);
        h.orchestrator
            .receive_all_pending(&sender.account().encode(), &Harness::private_key(&sender))
            .await
            .unwrap();
        let processed = h.node.calls("process");
        let generated = h.cache.stats().generated;

        let err = h
            .orchestrator
            .send_transaction(
                &sender.account().encode(),
                &keypair(4).account().encode(),
                "500",
                &Harness::private_key(&sender),
            )
            .await
            .unwrap_err();

        match &err {
            OperationError::InsufficientBalance {
                current,
                requested,
                shortfall,
                ..
            } => {
                assert_eq!(*current, Raw::new(100));
                assert_eq!(*requested, Raw::new(500));
                assert_eq!(*shortfall, Raw::new(400));
            }
            other => panic!("expected insufficient balance, got {other:?}"),
        }
        assert_eq!(h.node.calls("process"), processed);
        assert_eq!(h.cache.stats().generated, generated);

        let result = SendResult::from(Err::<SendReceipt, _>(err));
        assert!(!result.success);
        assert!(result.receipt.is_none());
    }

    #[tokio::test]
    async fn test_send_from_unopened_account() {
        let h = Harness::new();
        let sender = keypair(5);

        let err = h
            .orchestrator
            .send_transaction(
                &sender.account().encode(),
                &keypair(6).account().encode(),
                "1",
                &Harness::private_key(&sender),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::AccountNotInitialized { .. }));
        assert_eq!(h.node.calls("process"), 0);
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected_before_network() {
        let h = Harness::new();
        let sender = keypair(7);
        for amount in ["0", "1.5", "-1", "lots"] {
            let err = h
                .orchestrator
                .send_transaction(
                    &sender.account().encode(),
                    &keypair(8).account().encode(),
                    amount,
                    &Harness::private_key(&sender),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, OperationError::InvalidAmount { .. }), "{amount}");
        }
        assert_eq!(h.node.calls("account_info"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_sends_never_fork_the_chain() {
        let h = Harness::new();
        let sender = keypair(9);
        let address = sender.account().encode();
        let key = Harness::private_key(&sender);
        h.fund(&sender, 1_000);
        h.orchestrator
            .receive_all_pending(&address, &key)
            .await
            .unwrap();

        let to_a = keypair(10).account().encode();
        let to_b = keypair(11).account().encode();
        let (a, b) = tokio::join!(
            h.orchestrator.send_transaction(&address, &to_a, "100", &key),
            h.orchestrator.send_transaction(&address, &to_b, "200", &key),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(h.node.balance_of(&sender.account()), Raw::new(700));

        let chain: Vec<_> = h
            .node
            .accepted()
            .into_iter()
            .filter(|(block, _, _)| block.account == sender.account())
            .collect();
        assert_eq!(chain.len(), 3);
        let previous: HashSet<_> = chain.iter().map(|(block, _, _)| block.previous).collect();
        assert_eq!(previous.len(), chain.len());
    }

    #[tokio::test]
    async fn test_lost_send_reply_publishes_once() {
        // process #1 opens the sender, process #2 is the send
        let h = Harness::builder()
            .flaky(|c| c.lose_reply("process", 2))
            .build();
        let sender = keypair(12);
        let recipient = keypair(13);
        h.fund(&sender, 1_000);

        let receipt = h
            .orchestrator
            .send_transaction(
                &sender.account().encode(),
                &recipient.account().encode(),
                "400",
                &Harness::private_key(&sender),
            )
            .await
            .unwrap();

        let sends: Vec<_> = h
            .node
            .accepted()
            .into_iter()
            .filter(|(_, subtype, _)| *subtype == BlockSubtype::Send)
            .collect();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].2, receipt.hash);
        assert_eq!(receipt.new_balance, Raw::new(600));
        assert_eq!(h.node.balance_of(&sender.account()), Raw::new(600));
        assert_eq!(h.node.receivable_count(&recipient.account()), 1);
        assert_eq!(h.node.calls("process"), 3);
    }
}
