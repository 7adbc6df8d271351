// ABOUTME: User management database operations
// ABOUTME: Handles user creation, lookup, and profile updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;

impl Database {
    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email or username is already in use
    /// - Database operation fails
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (
                id, email, username, display_name, bio, is_active, created_at,
                last_activity, current_streak, longest_streak, total_points,
                followers_count, following_count
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_activity)
        .bind(user.current_streak)
        .bind(user.longest_streak)
        .bind(user.total_points)
        .bind(user.followers_count)
        .bind(user.following_count)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
            {
                AppError::invalid_input("Email or username already in use")
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let user_id_str = user_id.to_string();
        self.get_user_by_field("id", &user_id_str).await
    }

    /// Get a user by ID, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the query fails
    pub async fn get_user_required(&self, user_id: Uuid) -> AppResult<User> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with ID: {user_id}")))
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_by_field("email", email).await
    }

    /// Get a user by username
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.get_user_by_field("username", username).await
    }

    /// Internal implementation for getting a user
    async fn get_user_by_field(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, email, username, display_name, bio, is_active, created_at,
                   last_activity, current_streak, longest_streak, total_points,
                   followers_count, following_count
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by {field}: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Update a user's display name and bio
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or database update fails
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        bio: Option<&str>,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio)
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(display_name)
        .bind(bio)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user profile: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with ID: {user_id}")));
        }

        self.get_user_required(user_id).await
    }

    /// Get total user count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user count: {e}")))?;
        Ok(count)
    }
}

/// Convert a database row to a [`User`]
pub(crate) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse user id UUID: {e}")))?,
        email: row.get("email"),
        username: row.get("username"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        last_activity: row.get("last_activity"),
        current_streak: row.get("current_streak"),
        longest_streak: row.get("longest_streak"),
        total_points: row.get("total_points"),
        followers_count: row.get("followers_count"),
        following_count: row.get("following_count"),
    })
}
