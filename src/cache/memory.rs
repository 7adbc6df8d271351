// ABOUTME: In-memory leaderboard cache backed by a concurrent map
// ABOUTME: Process-wide, no TTL; entries live until explicitly invalidated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use async_trait::async_trait;
use dashmap::DashMap;

use super::LeaderboardCache;
use crate::errors::AppResult;
use crate::models::LeaderboardEntry;

/// Process-wide in-memory cache
///
/// Backed by a [`DashMap`] so concurrent readers never block each other;
/// a write to one key only contends with readers of that key's shard.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Vec<LeaderboardEntry>>,
}

impl InMemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaderboardCache for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<LeaderboardEntry>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, entries: Vec<LeaderboardEntry>) -> AppResult<()> {
        self.entries.insert(key.to_owned(), entries);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
