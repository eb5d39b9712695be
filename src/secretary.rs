//! The quota ledger ("secretary").
//!
//! Tracks, per platform, how many backfills the engine may still trigger in
//! the current accounting period. The orchestrator reads the remaining count
//! once before its loop and debits once after it — a single-read/single-write
//! pattern that bounds ledger contention and keeps the consumption accounting
//! simple. The ledger is not designed for concurrent debits; external
//! scheduling guarantees at most one orchestrator instance at a time.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Per-platform backfill quota ledger.
#[async_trait]
pub trait Secretary: Send + Sync {
    /// Returns how many backfills are left for the platform in the current
    /// accounting period.
    async fn backfills_left(&self, platform: &str) -> Result<u32>;

    /// Debits the platform's quota by the number of backfills actually
    /// consumed during a pass. Called once per pass, after the loop.
    async fn consume_backfills(&self, platform: &str, count: u32) -> Result<()>;
}

/// In-memory quota ledger for testing.
#[derive(Debug, Default)]
pub struct InMemorySecretary {
    remaining: RwLock<HashMap<String, u32>>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::storage("secretary lock poisoned")
}

impl InMemorySecretary {
    /// Creates an empty ledger; unknown platforms have zero quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-loaded with per-platform budgets.
    #[must_use]
    pub fn with_budgets(budgets: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            remaining: RwLock::new(budgets.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Secretary for InMemorySecretary {
    async fn backfills_left(&self, platform: &str) -> Result<u32> {
        let remaining = self.remaining.read().map_err(poison_err)?;
        Ok(remaining.get(platform).copied().unwrap_or(0))
    }

    async fn consume_backfills(&self, platform: &str, count: u32) -> Result<()> {
        let mut remaining = self.remaining.write().map_err(poison_err)?;
        let left = remaining.entry(platform.to_string()).or_insert(0);
        *left = left.saturating_sub(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_platform_has_zero_quota() -> Result<()> {
        let secretary = InMemorySecretary::new();
        assert_eq!(secretary.backfills_left("linux").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn consume_debits_remaining() -> Result<()> {
        let secretary = InMemorySecretary::with_budgets([("linux".to_string(), 10)]);
        secretary.consume_backfills("linux", 3).await?;
        assert_eq!(secretary.backfills_left("linux").await?, 7);
        Ok(())
    }

    #[tokio::test]
    async fn consume_saturates_at_zero() -> Result<()> {
        let secretary = InMemorySecretary::with_budgets([("linux".to_string(), 2)]);
        secretary.consume_backfills("linux", 5).await?;
        assert_eq!(secretary.backfills_left("linux").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn platforms_are_independent() -> Result<()> {
        let secretary = InMemorySecretary::with_budgets([
            ("linux".to_string(), 4),
            ("windows".to_string(), 6),
        ]);
        secretary.consume_backfills("linux", 4).await?;
        assert_eq!(secretary.backfills_left("linux").await?, 0);
        assert_eq!(secretary.backfills_left("windows").await?, 6);
        Ok(())
    }
}
