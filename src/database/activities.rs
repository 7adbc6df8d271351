// ABOUTME: Daily activity tracking database operations
// ABOUTME: One row per (user, date), upserted; window sums feed challenge progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::DailyActivity;

impl Database {
    /// Insert or update the daily activity row for (user, date)
    ///
    /// The unique constraint on (user, date) makes this idempotent: a
    /// second write for the same day overwrites the metrics in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert_daily_activity(&self, activity: &DailyActivity) -> AppResult<DailyActivity> {
        sqlx::query(
            r"
            INSERT INTO daily_activities (
                id, user_id, date, steps, distance, calories_burned, active_minutes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(user_id, date) DO UPDATE SET
                steps = $4,
                distance = $5,
                calories_burned = $6,
                active_minutes = $7
            ",
        )
        .bind(activity.id.to_string())
        .bind(activity.user_id.to_string())
        .bind(activity.date)
        .bind(activity.steps)
        .bind(activity.distance)
        .bind(activity.calories_burned)
        .bind(activity.active_minutes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert daily activity: {e}")))?;

        self.get_daily_activity(activity.user_id, activity.date)
            .await?
            .ok_or_else(|| AppError::internal("Daily activity missing after upsert"))
    }

    /// Get the daily activity row for (user, date)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_daily_activity(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<DailyActivity>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, date, steps, distance, calories_burned, active_minutes
            FROM daily_activities WHERE user_id = $1 AND date = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get daily activity: {e}")))?;

        row.as_ref().map(row_to_activity).transpose()
    }

    /// Delete the daily activity row for (user, date)
    ///
    /// # Errors
    ///
    /// Returns an error if the row is not found or the query fails
    pub async fn delete_daily_activity(&self, user_id: Uuid, date: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM daily_activities WHERE user_id = $1 AND date = $2")
            .bind(user_id.to_string())
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete daily activity: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Daily activity for user {user_id} on {date}"
            )));
        }

        Ok(())
    }

    /// Sum steps over the window, inclusive on both ends
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_steps_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            r"
            SELECT SUM(steps) FROM daily_activities
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum steps in window: {e}")))?;

        Ok(sum.unwrap_or(0))
    }

    /// Sum distance (km) over the window, inclusive on both ends
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_distance_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<f64> {
        let sum: Option<f64> = sqlx::query_scalar(
            r"
            SELECT SUM(distance) FROM daily_activities
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum distance in window: {e}")))?;

        Ok(sum.unwrap_or(0.0))
    }
}

fn row_to_activity(row: &SqliteRow) -> AppResult<DailyActivity> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    Ok(DailyActivity {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse activity id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse activity user UUID: {e}")))?,
        date: row.get("date"),
        steps: row.get("steps"),
        distance: row.get("distance"),
        calories_burned: row.get("calories_burned"),
        active_minutes: row.get("active_minutes"),
    })
}
