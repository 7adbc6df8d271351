// ABOUTME: Workout plan and session database operations
// ABOUTME: Includes the window aggregates used by challenge progress recomputation
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
use crate::models::{Difficulty, WorkoutPlan, WorkoutSession};

impl Database {
    /// Create a workout plan
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_workout_plan(&self, plan: &WorkoutPlan) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO workout_plans (
                id, user_id, name, description, difficulty, is_public, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.difficulty.as_str())
        .bind(plan.is_public)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout plan: {e}")))?;

        Ok(plan.id)
    }

    /// Get a workout plan by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_workout_plan(&self, plan_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, difficulty, is_public, created_at
            FROM workout_plans WHERE id = $1
            ",
        )
        .bind(plan_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout plan: {e}")))?;

        row.as_ref().map(row_to_plan).transpose()
    }

    /// Create a workout session
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_workout_session(&self, session: &WorkoutSession) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO workout_sessions (
                id, user_id, workout_plan_id, name, notes, start_time, end_time,
                calories_burned, points_earned, is_completed
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.workout_plan_id.map(|id| id.to_string()))
        .bind(&session.name)
        .bind(&session.notes)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.calories_burned)
        .bind(session.points_earned)
        .bind(session.is_completed)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout session: {e}")))?;

        Ok(session.id)
    }

    /// Get a workout session by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_workout_session(&self, session_id: Uuid) -> AppResult<Option<WorkoutSession>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, workout_plan_id, name, notes, start_time, end_time,
                   calories_burned, points_earned, is_completed
            FROM workout_sessions WHERE id = $1
            ",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout session: {e}")))?;

        row.as_ref().map(row_to_session).transpose()
    }

    /// Get a workout session by ID, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not found or the query fails
    pub async fn get_workout_session_required(
        &self,
        session_id: Uuid,
    ) -> AppResult<WorkoutSession> {
        self.get_workout_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workout session with ID: {session_id}")))
    }

    /// List a user's workout sessions, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_workout_sessions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<WorkoutSession>> {
        let limit =
            i64::try_from(limit).map_err(|_| AppError::invalid_input("Listing limit too large"))?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, workout_plan_id, name, notes, start_time, end_time,
                   calories_burned, points_earned, is_completed
            FROM workout_sessions
            WHERE user_id = $1
            ORDER BY start_time DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout sessions: {e}")))?;

        rows.iter().map(row_to_session).collect()
    }

    /// Count completed sessions whose start date falls in the window
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_completed_sessions_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM workout_sessions
            WHERE user_id = $1
              AND is_completed = TRUE
              AND date(start_time) BETWEEN $2 AND $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sessions in window: {e}")))?;

        Ok(count)
    }

    /// Sum points earned by completed sessions whose start date falls in the window
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_points_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            r"
            SELECT SUM(points_earned) FROM workout_sessions
            WHERE user_id = $1
              AND is_completed = TRUE
              AND date(start_time) BETWEEN $2 AND $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum points in window: {e}")))?;

        Ok(sum.unwrap_or(0))
    }
}

fn row_to_plan(row: &SqliteRow) -> AppResult<WorkoutPlan> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let difficulty: String = row.get("difficulty");
    Ok(WorkoutPlan {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse plan id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse plan user UUID: {e}")))?,
        name: row.get("name"),
        description: row.get("description"),
        difficulty: Difficulty::from_str(&difficulty)?,
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
    })
}

/// Convert a database row to a [`WorkoutSession`]
pub(crate) fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let plan_id: Option<String> = row.get("workout_plan_id");
    Ok(WorkoutSession {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse session id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse session user UUID: {e}")))?,
        workout_plan_id: plan_id
            .map(|s| {
                Uuid::parse_str(&s).map_err(|e| {
                    AppError::internal(format!("Failed to parse session plan UUID: {e}"))
                })
            })
            .transpose()?,
        name: row.get("name"),
        notes: row.get("notes"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        calories_burned: row.get("calories_burned"),
        points_earned: row.get("points_earned"),
        is_completed: row.get("is_completed"),
    })
}
