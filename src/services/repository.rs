use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::TripPool;
use crate::services::postgres::PostgresError;

/// Storage for trip pools
#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// Insert or replace a pool
    async fn save(&self, pool: &TripPool) -> Result<(), PostgresError>;

    /// Replace a stored pool only while it is still at `expected_version`
    ///
    /// Returns `false` when the pool is gone or another writer got there first.
    async fn update(&self, pool: &TripPool, expected_version: i64) -> Result<bool, PostgresError>;

    async fn find_by_id(&self, pool_id: &str) -> Result<Option<TripPool>, PostgresError>;

    /// Pools in which the user is an active member
    async fn find_by_member(&self, user_id: &str) -> Result<Vec<TripPool>, PostgresError>;

    async fn find_by_creator(&self, user_id: &str) -> Result<Vec<TripPool>, PostgresError>;

    /// FORMING or ACTIVE pools whose dates touch `[start, end]`
    async fn find_open_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TripPool>, PostgresError>;

    async fn health_check(&self) -> Result<bool, PostgresError>;
}

/// Process-local pool store, used when no database is configured
#[derive(Default)]
pub struct InMemoryPoolRepository {
    pools: RwLock<HashMap<String, TripPool>>,
}

impl InMemoryPoolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, predicate: F) -> Vec<TripPool>
    where
        F: Fn(&TripPool) -> bool,
    {
        let pools = self.pools.read().await;
        let mut selected: Vec<TripPool> =
            pools.values().filter(|p| predicate(p)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}

#[async_trait]
impl PoolRepository for InMemoryPoolRepository {
    async fn save(&self, pool: &TripPool) -> Result<(), PostgresError> {
        self.pools
            .write()
            .await
            .insert(pool.pool_id.clone(), pool.clone());
        Ok(())
    }

    async fn update(&self, pool: &TripPool, expected_version: i64) -> Result<bool, PostgresError> {
        let mut pools = self.pools.write().await;
        match pools.get_mut(&pool.pool_id) {
            Some(stored) if stored.version == expected_version => {
                *stored = pool.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_id(&self, pool_id: &str) -> Result<Option<TripPool>, PostgresError> {
        Ok(self.pools.read().await.get(pool_id).cloned())
    }

    async fn find_by_member(&self, user_id: &str) -> Result<Vec<TripPool>, PostgresError> {
        Ok(self.select(|pool| pool.has_active_member(user_id)).await)
    }

    async fn find_by_creator(&self, user_id: &str) -> Result<Vec<TripPool>, PostgresError> {
        Ok(self.select(|pool| pool.created_by_user_id == user_id).await)
    }

    async fn find_open_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TripPool>, PostgresError> {
        Ok(self
            .select(|pool| {
                pool.status.is_open() && pool.start_date <= end && pool.end_date >= start
            })
            .await)
    }

    async fn health_check(&self) -> Result<bool, PostgresError> {
        Ok(true)
    }
}
