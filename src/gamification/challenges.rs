// ABOUTME: Challenge progress aggregation triggered by workouts and daily activity
// ABOUTME: Recomputes progress from scratch; completion is a one-way transition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::LeaderboardCache;
use crate::config::GamificationConfig;
use crate::constants::GLOBAL_LEADERBOARD_CACHE_KEY;
use crate::database::challenges::row_to_progress;
use crate::database::scores::credit_points;
use crate::database::social::insert_notification;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::gamification::locks::UserLockRegistry;
use crate::models::{Challenge, ChallengeProgress, ChallengeTargetType, NotificationType};

/// Recomputes a user's progress toward active challenges
///
/// Progress is re-aggregated from the source tables on every trigger
/// rather than incremented, so retroactive edits and deletes of activity
/// records can never leave a stale counter behind. The cost is one window
/// aggregate per trigger, bounded by the challenge duration.
#[derive(Clone)]
pub struct ChallengeProgressAggregator {
    db: Database,
    cache: Arc<dyn LeaderboardCache>,
    locks: Arc<UserLockRegistry>,
    config: GamificationConfig,
}

impl ChallengeProgressAggregator {
    /// Create a new aggregator
    #[must_use]
    pub fn new(
        db: Database,
        cache: Arc<dyn LeaderboardCache>,
        locks: Arc<UserLockRegistry>,
        config: GamificationConfig,
    ) -> Self {
        Self {
            db,
            cache,
            locks,
            config,
        }
    }

    /// Recompute progress after a daily-activity upsert
    ///
    /// Acquires the user's lock for the duration; use
    /// [`recompute_for_date`](Self::recompute_for_date) from callers that
    /// already hold it.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails
    pub async fn on_daily_activity(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<ChallengeProgress>> {
        let _guard = self.locks.lock(user_id).await;
        self.recompute_for_date(user_id, date).await
    }

    /// Recompute progress for every active, covering challenge the user
    /// participates in
    ///
    /// Caller must hold the user's lock.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails
    pub(crate) async fn recompute_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<ChallengeProgress>> {
        let challenges = self.db.active_challenges_for(user_id, date).await?;

        let mut results = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            results.push(self.recompute_challenge(user_id, &challenge).await?);
        }
        Ok(results)
    }

    /// Recompute one (user, challenge) progress row and persist it
    async fn recompute_challenge(
        &self,
        user_id: Uuid,
        challenge: &Challenge,
    ) -> AppResult<ChallengeProgress> {
        let progress = self.aggregate_progress(user_id, challenge).await?;

        let now = Utc::now();
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // Resolve or create the progress row for the pair
        sqlx::query(
            r"
            INSERT INTO user_challenge_progress (id, user_id, challenge_id, progress, completed)
            VALUES ($1, $2, $3, 0, FALSE)
            ON CONFLICT(user_id, challenge_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(challenge.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create progress row: {e}")))?;

        let row = sqlx::query(
            r"
            SELECT id, user_id, challenge_id, progress, completed, completed_at
            FROM user_challenge_progress
            WHERE user_id = $1 AND challenge_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(challenge.id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read progress row: {e}")))?;
        let mut record = row_to_progress(&row)?;

        // Completion never reverts, even if later data pulls the
        // recomputed progress back below the target
        let newly_completed = !record.completed && progress >= challenge.target as f64;

        if newly_completed {
            sqlx::query(
                r"
                UPDATE user_challenge_progress
                SET progress = $2, completed = TRUE, completed_at = $3
                WHERE id = $1
                ",
            )
            .bind(record.id.to_string())
            .bind(progress)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update progress row: {e}")))?;

            credit_points(
                &mut tx,
                user_id,
                self.config.challenge_completion_points,
                false,
                now,
            )
            .await?;

            insert_notification(
                &mut tx,
                user_id,
                NotificationType::Challenge,
                &format!("Challenge completed: {}", challenge.name),
                Some(challenge.id),
            )
            .await?;
        } else {
            sqlx::query("UPDATE user_challenge_progress SET progress = $2 WHERE id = $1")
                .bind(record.id.to_string())
                .bind(progress)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to update progress row: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit progress update: {e}")))?;

        if newly_completed {
            // Bonus points changed the ledger; next leaderboard read repopulates
            self.cache.invalidate(GLOBAL_LEADERBOARD_CACHE_KEY).await?;
        }

        record.progress = progress;
        if newly_completed {
            record.completed = true;
            record.completed_at = Some(now);
        }
        Ok(record)
    }

    /// Aggregate the challenge metric over its window for one user
    async fn aggregate_progress(&self, user_id: Uuid, challenge: &Challenge) -> AppResult<f64> {
        let (start, end) = (challenge.start_date, challenge.end_date);
        let value = match challenge.target_type {
            ChallengeTargetType::Workouts => self
                .db
                .count_completed_sessions_in_window(user_id, start, end)
                .await? as f64,
            ChallengeTargetType::Steps => {
                self.db.sum_steps_in_window(user_id, start, end).await? as f64
            }
            ChallengeTargetType::Distance => {
                self.db.sum_distance_in_window(user_id, start, end).await?
            }
            ChallengeTargetType::Points => {
                self.db.sum_points_in_window(user_id, start, end).await? as f64
            }
        };
        Ok(value)
    }
}
