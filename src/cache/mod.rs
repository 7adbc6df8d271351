// ABOUTME: Cache abstraction for the leaderboard read view
// ABOUTME: Pluggable backend trait with in-memory and no-op implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// In-memory cache backend
pub mod memory;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::LeaderboardEntry;

/// Cache port for leaderboard snapshots
///
/// The ledger writers call [`invalidate`](LeaderboardCache::invalidate)
/// after committing any score change; the next read repopulates. There is
/// no TTL, invalidation is purely event-driven.
#[async_trait]
pub trait LeaderboardCache: Send + Sync {
    /// Fetch a cached snapshot, if present
    async fn get(&self, key: &str) -> AppResult<Option<Vec<LeaderboardEntry>>>;

    /// Store a snapshot under `key`
    async fn set(&self, key: &str, entries: Vec<LeaderboardEntry>) -> AppResult<()>;

    /// Delete the snapshot under `key`
    async fn invalidate(&self, key: &str) -> AppResult<()>;
}

/// Cache backend that stores nothing; every read is a miss
///
/// Useful in tests that want to exercise the repopulation path on every
/// call, and as a stand-in when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCache;

#[async_trait]
impl LeaderboardCache for NoOpCache {
    async fn get(&self, _key: &str) -> AppResult<Option<Vec<LeaderboardEntry>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _entries: Vec<LeaderboardEntry>) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }
}
