// ABOUTME: Leaderboard read views over the score ledger
// ABOUTME: Global view is cached process-wide; challenge view reads through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::cache::LeaderboardCache;
use crate::constants::GLOBAL_LEADERBOARD_CACHE_KEY;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::LeaderboardEntry;

/// Cached leaderboard reads
///
/// The global view follows the cache-aside pattern: check the cache,
/// repopulate from the ledger on a miss. Ledger writers invalidate the key
/// after commit, so a hit is always consistent with the last committed
/// write.
#[derive(Clone)]
pub struct LeaderboardService {
    db: Database,
    cache: Arc<dyn LeaderboardCache>,
    size: usize,
}

impl LeaderboardService {
    /// Create a new service serving `size` entries
    #[must_use]
    pub fn new(db: Database, cache: Arc<dyn LeaderboardCache>, size: usize) -> Self {
        Self { db, cache, size }
    }

    /// Read the global leaderboard, top entries by points descending
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query fails
    pub async fn global(&self) -> AppResult<Vec<LeaderboardEntry>> {
        if let Some(cached) = self.cache.get(GLOBAL_LEADERBOARD_CACHE_KEY).await? {
            debug!("global leaderboard served from cache");
            return Ok(cached);
        }

        let entries = self.db.top_scores(self.size).await?;
        self.cache
            .set(GLOBAL_LEADERBOARD_CACHE_KEY, entries.clone())
            .await?;
        Ok(entries)
    }

    /// Read the leaderboard restricted to a challenge's participants
    ///
    /// Uncached: the participant set is small and changes with joins.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query fails
    pub async fn for_challenge(&self, challenge_id: Uuid) -> AppResult<Vec<LeaderboardEntry>> {
        self.db
            .top_scores_for_challenge(challenge_id, self.size)
            .await
    }

    /// Drop the cached global snapshot
    ///
    /// Exposed for ledger writers outside the gamification services.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails
    pub async fn invalidate(&self) -> AppResult<()> {
        self.cache.invalidate(GLOBAL_LEADERBOARD_CACHE_KEY).await
    }
}
