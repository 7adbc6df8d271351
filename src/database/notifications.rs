// ABOUTME: Notification storage and retrieval
// ABOUTME: Rows are written by social and challenge events; reads live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Notification, NotificationType};

impl Database {
    /// List a user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Notification>> {
        let limit =
            i64::try_from(limit).map_err(|_| AppError::invalid_input("Listing limit too large"))?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, notification_type, message, is_read, created_at, related_id
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        rows.iter().map(row_to_notification).collect()
    }

    /// Count a user's unread notifications
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_unread_notifications(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count notifications: {e}")))?;

        Ok(count)
    }

    /// Mark a notification as read
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is not found or the query fails
    pub async fn mark_notification_read(&self, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(notification_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark notification read: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Notification with ID: {notification_id}"
            )));
        }

        Ok(())
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<Notification> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let notification_type: String = row.get("notification_type");
    let related_id: Option<String> = row.get("related_id");
    Ok(Notification {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse notification UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| {
            AppError::internal(format!("Failed to parse notification user UUID: {e}"))
        })?,
        notification_type: NotificationType::from_str(&notification_type)?,
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
        related_id: related_id
            .map(|s| {
                Uuid::parse_str(&s).map_err(|e| {
                    AppError::internal(format!("Failed to parse related id UUID: {e}"))
                })
            })
            .transpose()?,
    })
}
