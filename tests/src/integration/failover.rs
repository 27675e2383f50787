//! Node rotation under rate limits and connect failures.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        keypair, transport_config, FlakyConnector, Harness, SimulatedNode, NODE_A, NODE_B,
        RECEIVE_THRESHOLD, SEND_THRESHOLD,
    };
    use nm_01_rpc_transport::{NodeConnector, NodeRpc, RpcTransport, TransportError};
    use serde_json::json;
    use shared_types::Raw;
    use std::sync::Arc;

    fn transport(connector: &Arc<FlakyConnector>) -> RpcTransport {
        RpcTransport::with_connector(
            transport_config(),
            Arc::clone(connector) as Arc<dyn NodeConnector>,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_node_is_skipped() {
        let node = SimulatedNode::new(SEND_THRESHOLD, RECEIVE_THRESHOLD);
        let account = keypair(1).account();
        node.fund(&account, 10);
        let connector = Arc::new(FlakyConnector::new(node).rate_limit(NODE_A));
        let rpc = transport(&connector);

        let pending = rpc.pending(&account, 10, Raw::new(1)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(connector.attempts(), vec![NODE_A, NODE_B]);

        // The rotation sticks: the next call starts on the healthy node.
        assert_eq!(rpc.current_node().as_deref(), Some(NODE_B));
        rpc.account_info(&account).await.unwrap();
        assert_eq!(connector.attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_all_nodes_down_is_bounded() {
        let node = SimulatedNode::new(SEND_THRESHOLD, RECEIVE_THRESHOLD);
        let connector = Arc::new(
            FlakyConnector::new(node.clone())
                .unreachable(NODE_A)
                .unreachable(NODE_B),
        );
        let rpc = transport(&connector);

        let err = rpc.account_info(&keypair(2).account()).await.unwrap_err();
        match err {
            TransportError::Exhausted {
                action, attempts, ..
            } => {
                assert_eq!(action, "account_info");
                assert_eq!(attempts, 4);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(connector.attempts().len(), 4);
        assert_eq!(node.calls("account_info"), 0);
    }

    #[tokio::test]
    async fn test_node_error_is_not_retried_elsewhere() {
        let node = SimulatedNode::new(SEND_THRESHOLD, RECEIVE_THRESHOLD);
        let connector = Arc::new(FlakyConnector::new(node));
        let rpc = transport(&connector);

        let err = rpc.call("bootstrap_any", json!({})).await.unwrap_err();
        assert!(matches!(err, TransportError::Node { .. }));
        assert_eq!(connector.attempts(), vec![NODE_A]);
    }

    #[tokio::test]
    async fn test_receive_completes_through_the_second_node() {
        let h = Harness::builder()
            .flaky(|connector| connector.rate_limit(NODE_A))
            .build();
        let keys = keypair(3);
        h.fund(&keys, 77);

        let report = h
            .orchestrator
            .receive_all_pending(&keys.account().encode(), &Harness::private_key(&keys))
            .await
            .unwrap();

        assert_eq!(report.received_count(), 1);
        assert_eq!(h.node.balance_of(&keys.account()), Raw::new(77));
    }
}
