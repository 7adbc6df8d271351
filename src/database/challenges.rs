// ABOUTME: Challenge, participant, and progress-row database operations
// ABOUTME: Progress rows are written by the aggregator; reads live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Challenge, ChallengeProgress, ChallengeTargetType};

impl Database {
    /// Create a challenge
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_challenge(&self, challenge: &Challenge) -> AppResult<Uuid> {
        if challenge.end_date < challenge.start_date {
            return Err(AppError::invalid_input(
                "Challenge end date precedes start date",
            ));
        }

        sqlx::query(
            r"
            INSERT INTO challenges (
                id, name, description, start_date, end_date, target, target_type,
                created_by, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(challenge.id.to_string())
        .bind(&challenge.name)
        .bind(&challenge.description)
        .bind(challenge.start_date)
        .bind(challenge.end_date)
        .bind(challenge.target)
        .bind(challenge.target_type.as_str())
        .bind(challenge.created_by.to_string())
        .bind(challenge.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create challenge: {e}")))?;

        Ok(challenge.id)
    }

    /// Get a challenge by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_challenge(&self, challenge_id: Uuid) -> AppResult<Option<Challenge>> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, start_date, end_date, target, target_type,
                   created_by, is_active
            FROM challenges WHERE id = $1
            ",
        )
        .bind(challenge_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get challenge: {e}")))?;

        row.as_ref().map(row_to_challenge).transpose()
    }

    /// Get a challenge by ID, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is not found or the query fails
    pub async fn get_challenge_required(&self, challenge_id: Uuid) -> AppResult<Challenge> {
        self.get_challenge(challenge_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Challenge with ID: {challenge_id}")))
    }

    /// Add a user to a challenge's participants
    ///
    /// Joining twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge does not exist or the query fails
    pub async fn join_challenge(&self, challenge_id: Uuid, user_id: Uuid) -> AppResult<()> {
        // Validates existence and gives a clean not-found error
        self.get_challenge_required(challenge_id).await?;

        sqlx::query(
            r"
            INSERT INTO challenge_participants (challenge_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT(challenge_id, user_id) DO NOTHING
            ",
        )
        .bind(challenge_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to join challenge: {e}")))?;

        Ok(())
    }

    /// Deactivate a challenge so it stops accruing progress
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is not found or the query fails
    pub async fn deactivate_challenge(&self, challenge_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE challenges SET is_active = FALSE WHERE id = $1")
            .bind(challenge_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to deactivate challenge: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Challenge with ID: {challenge_id}"
            )));
        }

        Ok(())
    }

    /// Active challenges the user participates in whose window covers `date`
    ///
    /// This is the trigger query for progress recomputation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn active_challenges_for(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Challenge>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.name, c.description, c.start_date, c.end_date, c.target,
                   c.target_type, c.created_by, c.is_active
            FROM challenges c
            JOIN challenge_participants cp ON cp.challenge_id = c.id
            WHERE cp.user_id = $1
              AND c.is_active = TRUE
              AND c.start_date <= $2
              AND c.end_date >= $2
            ",
        )
        .bind(user_id.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list active challenges: {e}")))?;

        rows.iter().map(row_to_challenge).collect()
    }

    /// Get a user's progress row for a challenge
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_challenge_progress(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> AppResult<Option<ChallengeProgress>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, challenge_id, progress, completed, completed_at
            FROM user_challenge_progress
            WHERE user_id = $1 AND challenge_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(challenge_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get challenge progress: {e}")))?;

        row.as_ref().map(row_to_progress).transpose()
    }
}

fn row_to_challenge(row: &SqliteRow) -> AppResult<Challenge> {
    let id: String = row.get("id");
    let created_by: String = row.get("created_by");
    let target_type: String = row.get("target_type");
    Ok(Challenge {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse challenge id UUID: {e}")))?,
        name: row.get("name"),
        description: row.get("description"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        target: row.get("target"),
        target_type: ChallengeTargetType::from_str(&target_type)?,
        created_by: Uuid::parse_str(&created_by).map_err(|e| {
            AppError::internal(format!("Failed to parse challenge creator UUID: {e}"))
        })?,
        is_active: row.get("is_active"),
    })
}

/// Convert a database row to a [`ChallengeProgress`]
pub(crate) fn row_to_progress(row: &SqliteRow) -> AppResult<ChallengeProgress> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let challenge_id: String = row.get("challenge_id");
    Ok(ChallengeProgress {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse progress id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse progress user UUID: {e}")))?,
        challenge_id: Uuid::parse_str(&challenge_id).map_err(|e| {
            AppError::internal(format!("Failed to parse progress challenge UUID: {e}"))
        })?,
        progress: row.get("progress"),
        completed: row.get("completed"),
        completed_at: row.get("completed_at"),
    })
}
