// ABOUTME: User score ledger database operations
// ABOUTME: Score rows are created lazily and only ever increase
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{LeaderboardEntry, UserScore};

impl Database {
    /// Get a user's score entry, creating an empty one if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_or_create_score(&self, user_id: Uuid) -> AppResult<UserScore> {
        sqlx::query(
            r"
            INSERT INTO user_scores (user_id, points, workouts_completed, last_updated)
            VALUES ($1, 0, 0, $2)
            ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create score entry: {e}")))?;

        self.get_score(user_id)
            .await?
            .ok_or_else(|| AppError::internal("Score entry missing after get-or-create"))
    }

    /// Get a user's score entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_score(&self, user_id: Uuid) -> AppResult<Option<UserScore>> {
        let row = sqlx::query(
            r"
            SELECT user_id, points, workouts_completed, last_updated
            FROM user_scores WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get score entry: {e}")))?;

        row.as_ref().map(row_to_score).transpose()
    }

    /// Read the top score entries ordered by points descending
    ///
    /// This is the query behind the global leaderboard; results are cached
    /// by the leaderboard service, not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn top_scores(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = i64::try_from(limit)
            .map_err(|_| AppError::invalid_input("Leaderboard size too large"))?;

        let rows = sqlx::query(
            r"
            SELECT s.user_id, u.username, s.points, s.workouts_completed
            FROM user_scores s
            JOIN users u ON u.id = s.user_id
            ORDER BY s.points DESC, u.username ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read top scores: {e}")))?;

        rows.iter().map(row_to_leaderboard_entry).collect()
    }

    /// Read the top score entries among a challenge's participants
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn top_scores_for_challenge(
        &self,
        challenge_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = i64::try_from(limit)
            .map_err(|_| AppError::invalid_input("Leaderboard size too large"))?;

        let rows = sqlx::query(
            r"
            SELECT s.user_id, u.username, s.points, s.workouts_completed
            FROM user_scores s
            JOIN users u ON u.id = s.user_id
            JOIN challenge_participants cp ON cp.user_id = s.user_id
            WHERE cp.challenge_id = $1
            ORDER BY s.points DESC, u.username ASC
            LIMIT $2
            ",
        )
        .bind(challenge_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read challenge scores: {e}")))?;

        rows.iter().map(row_to_leaderboard_entry).collect()
    }
}

/// Credit points to the score ledger inside the caller's transaction
///
/// Creates the score row if missing, adds `points` (and one completed
/// workout when `completed_workout` is set), and mirrors the award into
/// `users.total_points` so the two can never disagree. `points` must be
/// non-negative: ledger values only increase.
pub(crate) async fn credit_points(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    points: i64,
    completed_workout: bool,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO user_scores (user_id, points, workouts_completed, last_updated)
        VALUES ($1, 0, 0, $2)
        ON CONFLICT(user_id) DO NOTHING
        ",
    )
    .bind(user_id.to_string())
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create score entry: {e}")))?;

    sqlx::query(
        r"
        UPDATE user_scores SET
            points = points + $2,
            workouts_completed = workouts_completed + $3,
            last_updated = $4
        WHERE user_id = $1
        ",
    )
    .bind(user_id.to_string())
    .bind(points)
    .bind(i64::from(completed_workout))
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to credit score entry: {e}")))?;

    sqlx::query("UPDATE users SET total_points = total_points + $2 WHERE id = $1")
        .bind(user_id.to_string())
        .bind(points)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to mirror total points: {e}")))?;

    Ok(())
}

fn row_to_score(row: &SqliteRow) -> AppResult<UserScore> {
    let user_id: String = row.get("user_id");
    Ok(UserScore {
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse score user UUID: {e}")))?,
        points: row.get("points"),
        workouts_completed: row.get("workouts_completed"),
        last_updated: row.get("last_updated"),
    })
}

fn row_to_leaderboard_entry(row: &SqliteRow) -> AppResult<LeaderboardEntry> {
    let user_id: String = row.get("user_id");
    Ok(LeaderboardEntry {
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse score user UUID: {e}")))?,
        username: row.get("username"),
        points: row.get("points"),
        workouts_completed: row.get("workouts_completed"),
    })
}
