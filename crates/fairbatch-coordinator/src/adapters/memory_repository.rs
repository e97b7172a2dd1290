//! In-memory batch repository.
//!
//! Backs unit and integration tests and single-node development runs.
//! Production deployments implement [`BatchRepository`] over a durable
//! store; the query semantics defined here are the reference behavior.

use crate::domain::batch::{Batch, BatchStatus};
use crate::ports::outbound::{
    BatchFilter, BatchRepository, BatchStatistics, Page, RepositoryError,
};
use async_trait::async_trait;
use fairbatch_types::{BatchId, Timestamp, U256};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// HashMap-backed repository with read-your-writes semantics.
///
/// Every load returns a cloned snapshot, so callers never observe another
/// request's in-flight mutation.
#[derive(Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<HashMap<BatchId, Batch>>,
    fail_next_save: Mutex<Option<String>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save` fail with the given message. For exercising
    /// the persistence failure paths in tests.
    pub fn fail_next_save(&self, message: impl Into<String>) {
        *self.fail_next_save.lock() = Some(message.into());
    }

    /// Number of stored batches.
    pub fn len(&self) -> usize {
        self.batches.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.batches.read().is_empty()
    }

    fn matches(batch: &Batch, filter: &BatchFilter) -> bool {
        if let Some(status) = filter.status {
            if batch.status() != status {
                return false;
            }
        }
        if let Some(method) = filter.ordering_method {
            if batch.ordering_method() != method {
                return false;
            }
        }
        if let Some(from) = filter.date_from {
            if batch.created_at() < from {
                return false;
            }
        }
        if let Some(to) = filter.date_to {
            if batch.created_at() > to {
                return false;
            }
        }
        true
    }

    fn sorted_newest_first(mut batches: Vec<Batch>) -> Vec<Batch> {
        batches.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        batches
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn save(&self, batch: &Batch) -> Result<(), RepositoryError> {
        if let Some(message) = self.fail_next_save.lock().take() {
            return Err(RepositoryError::Storage(message));
        }

        self.batches.write().insert(batch.id(), batch.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BatchId) -> Result<Option<Batch>, RepositoryError> {
        Ok(self.batches.read().get(&id).cloned())
    }

    async fn delete(&self, id: BatchId) -> Result<bool, RepositoryError> {
        Ok(self.batches.write().remove(&id).is_some())
    }

    async fn current_active_batch(
        &self,
        now: Timestamp,
    ) -> Result<Option<Batch>, RepositoryError> {
        let batches = self.batches.read();
        let active = batches
            .values()
            .filter(|b| {
                !b.status().is_terminal() && b.start_time() <= now && now < b.end_time()
            })
            .max_by_key(|b| b.start_time())
            .cloned();
        Ok(active)
    }

    async fn find_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self.batches.read();
        Ok(batches
            .values()
            .filter(|b| b.status() == status)
            .cloned()
            .collect())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<Batch>, RepositoryError> {
        let all: Vec<_> = self.batches.read().values().cloned().collect();
        let mut sorted = Self::sorted_newest_first(all);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn find_in_date_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self.batches.read();
        Ok(batches
            .values()
            .filter(|b| from <= b.created_at() && b.created_at() <= to)
            .cloned()
            .collect())
    }

    async fn find_paginated(
        &self,
        page: usize,
        limit: usize,
        filter: BatchFilter,
    ) -> Result<Page<Batch>, RepositoryError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let matching: Vec<_> = self
            .batches
            .read()
            .values()
            .filter(|b| Self::matches(b, &filter))
            .cloned()
            .collect();
        let sorted = Self::sorted_newest_first(matching);

        let total = sorted.len();
        let pages = total.div_ceil(limit);
        let items = sorted
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(Page {
            items,
            total,
            page,
            limit,
            pages,
        })
    }

    async fn statistics(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<BatchStatistics, RepositoryError> {
        let in_range: Vec<_> = {
            let batches = self.batches.read();
            batches
                .values()
                .filter(|b| from <= b.created_at() && b.created_at() <= to)
                .cloned()
                .collect()
        };

        if in_range.is_empty() {
            return Ok(BatchStatistics::default());
        }

        let total = in_range.len() as u64;
        let completed: Vec<_> = in_range
            .iter()
            .filter(|b| b.status() == BatchStatus::Completed)
            .collect();

        let commitment_sum: usize = in_range.iter().map(|b| b.commitment_count()).sum();
        let rate_sum: f64 = in_range.iter().map(|b| b.reveal_rate()).sum();

        let mut total_mev_extracted = U256::zero();
        let mut total_savings_generated = U256::zero();
        for batch in &completed {
            if let Some(metrics) = batch.metrics() {
                total_mev_extracted += metrics.extracted_value;
                total_savings_generated += metrics.savings_generated;
            }
        }

        Ok(BatchStatistics {
            total_batches: total,
            completed_batches: completed.len() as u64,
            average_commitments: commitment_sum as f64 / total as f64,
            average_reveal_rate: rate_sum / total as f64,
            total_mev_extracted,
            total_savings_generated,
        })
    }

    async fn exists(&self, id: BatchId) -> Result<bool, RepositoryError> {
        Ok(self.batches.read().contains_key(&id))
    }

    async fn count_by_status(&self, status: BatchStatus) -> Result<usize, RepositoryError> {
        Ok(self
            .batches
            .read()
            .values()
            .filter(|b| b.status() == status)
            .count())
    }

    async fn find_expired(&self, now: Timestamp) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self.batches.read();
        Ok(batches
            .values()
            .filter(|b| b.is_expired(now))
            .cloned()
            .collect())
    }
}
