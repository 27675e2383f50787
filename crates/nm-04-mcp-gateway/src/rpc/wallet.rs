//! Block-publishing tools and work cache access.
//!
//! `sendTransaction` always answers with a result object carrying
//! `success`; callers branch on it rather than on JSON-RPC errors. The
//! other write tools surface failures as JSON-RPC errors with the tagged
//! operation error in `data`.

use crate::domain::error::{ApiError, ApiResult};
use nm_02_work_cache::WorkCache;
use nm_03_block_orchestrator::{BlockOrchestratorApi, SendResult};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

fn to_value<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Orchestrator-backed handler
pub struct WalletRpc {
    orchestrator: Arc<dyn BlockOrchestratorApi>,
    cache: Arc<WorkCache>,
}

impl WalletRpc {
    pub fn new(orchestrator: Arc<dyn BlockOrchestratorApi>, cache: Arc<WorkCache>) -> Self {
        Self {
            orchestrator,
            cache,
        }
    }

    /// getAccountStatus
    #[instrument(skip(self))]
    pub async fn account_status(&self, address: &str) -> ApiResult<Value> {
        let status = self.orchestrator.account_status(address).await?;
        to_value(&status)
    }

    /// initializeAccount
    #[instrument(skip(self, private_key))]
    pub async fn initialize_account(&self, address: &str, private_key: &str) -> ApiResult<Value> {
        let result = self
            .orchestrator
            .initialize_account(address, private_key)
            .await?;
        to_value(&result)
    }

    /// receiveAllPending. Per-block failures live inside the report.
    #[instrument(skip(self, private_key))]
    pub async fn receive_all_pending(&self, address: &str, private_key: &str) -> ApiResult<Value> {
        let report = self
            .orchestrator
            .receive_all_pending(address, private_key)
            .await?;
        to_value(&report)
    }

    /// sendTransaction
    #[instrument(skip(self, private_key))]
    pub async fn send_transaction(
        &self,
        from_address: &str,
        to_address: &str,
        amount_raw: &str,
        private_key: &str,
    ) -> ApiResult<Value> {
        let outcome = self
            .orchestrator
            .send_transaction(from_address, to_address, amount_raw, private_key)
            .await;
        to_value(&SendResult::from(outcome))
    }

    /// precomputeWork
    #[instrument(skip(self))]
    pub async fn precompute_work(&self, address: &str) -> ApiResult<Value> {
        let warmed = self.orchestrator.warm_work(address).await?;
        to_value(&warmed)
    }

    /// getWorkCacheStats
    pub fn work_cache_stats(&self) -> ApiResult<Value> {
        to_value(&self.cache.stats())
    }
}
