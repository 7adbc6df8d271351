// ABOUTME: Social graph database operations: posts, likes, comments, follows
// ABOUTME: Denormalized counters are recounted inside the mutating transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Comment, Follow, FollowRequest, FollowRequestStatus, Like, NotificationType, Post,
};

impl Database {
    /// Create a post
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_post(&self, post: &Post) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO posts (
                id, user_id, content, created_at, updated_at, likes_count, comments_count
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(post.id.to_string())
        .bind(post.user_id.to_string())
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .bind(post.likes_count)
        .bind(post.comments_count)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create post: {e}")))?;

        Ok(post.id)
    }

    /// Get a post by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_post(&self, post_id: Uuid) -> AppResult<Option<Post>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, content, created_at, updated_at, likes_count, comments_count
            FROM posts WHERE id = $1
            ",
        )
        .bind(post_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get post: {e}")))?;

        row.as_ref().map(row_to_post).transpose()
    }

    /// Get a post by ID, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the post is not found or the query fails
    pub async fn get_post_required(&self, post_id: Uuid) -> AppResult<Post> {
        self.get_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Post with ID: {post_id}")))
    }

    /// List posts from the user and everyone they follow, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_feed(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<Post>> {
        let limit =
            i64::try_from(limit).map_err(|_| AppError::invalid_input("Feed limit too large"))?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, content, created_at, updated_at, likes_count, comments_count
            FROM posts
            WHERE user_id = $1
               OR user_id IN (SELECT following_id FROM follows WHERE follower_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list feed: {e}")))?;

        rows.iter().map(row_to_post).collect()
    }

    /// Like a post and recount its like counter
    ///
    /// The recount runs in the same transaction as the insert, so readers
    /// never observe a like without its counter update.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The post does not exist
    /// - The user already liked the post (unique constraint)
    /// - Database operation fails
    pub async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> AppResult<Like> {
        let post = self.get_post_required(post_id).await?;

        let like = Like {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: Utc::now(),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO likes (id, user_id, post_id, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(like.id.to_string())
        .bind(like.user_id.to_string())
        .bind(like.post_id.to_string())
        .bind(like.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
            {
                AppError::invalid_input("Post already liked by this user")
            } else {
                AppError::database(format!("Failed to create like: {e}"))
            }
        })?;

        recount_post_counters(&mut tx, post_id).await?;

        if post.user_id != user_id {
            let liker = username_for(&mut tx, user_id).await?;
            insert_notification(
                &mut tx,
                post.user_id,
                NotificationType::Like,
                &format!("{liker} liked your post"),
                Some(post_id),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit like: {e}")))?;

        Ok(like)
    }

    /// Remove a like and recount the post's like counter
    ///
    /// # Errors
    ///
    /// Returns an error if the like does not exist or the operation fails
    pub async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id.to_string())
            .bind(post_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete like: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Like by user {user_id} on post {post_id}"
            )));
        }

        recount_post_counters(&mut tx, post_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit unlike: {e}")))?;

        Ok(())
    }

    /// Comment on a post and recount its comment counter
    ///
    /// # Errors
    ///
    /// Returns an error if the post does not exist or the operation fails
    pub async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: impl Into<String>,
    ) -> AppResult<Comment> {
        let post = self.get_post_required(post_id).await?;

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO comments (id, user_id, post_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(comment.id.to_string())
        .bind(comment.user_id.to_string())
        .bind(comment.post_id.to_string())
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create comment: {e}")))?;

        recount_post_counters(&mut tx, post_id).await?;

        if post.user_id != user_id {
            let commenter = username_for(&mut tx, user_id).await?;
            insert_notification(
                &mut tx,
                post.user_id,
                NotificationType::Comment,
                &format!("{commenter} commented on your post"),
                Some(post_id),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit comment: {e}")))?;

        Ok(comment)
    }

    /// Delete a comment (author only) and recount the post's counter
    ///
    /// # Errors
    ///
    /// Returns an error if the comment is not found for this user or the
    /// operation fails
    pub async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let post_id: Option<String> =
            sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1 AND user_id = $2")
                .bind(comment_id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to look up comment: {e}")))?;

        let Some(post_id) = post_id else {
            return Err(AppError::not_found(format!(
                "Comment with ID: {comment_id}"
            )));
        };
        let post_id = Uuid::parse_str(&post_id)
            .map_err(|e| AppError::internal(format!("Failed to parse comment post UUID: {e}")))?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete comment: {e}")))?;

        recount_post_counters(&mut tx, post_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit comment deletion: {e}")))?;

        Ok(())
    }

    /// List a post's comments, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_comments(&self, post_id: Uuid, limit: usize) -> AppResult<Vec<Comment>> {
        let limit =
            i64::try_from(limit).map_err(|_| AppError::invalid_input("Listing limit too large"))?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, post_id, content, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            ",
        )
        .bind(post_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list comments: {e}")))?;

        rows.iter().map(row_to_comment).collect()
    }

    /// Create a follow request from one user to another
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The users are the same
    /// - A request between the pair already exists
    /// - The follow edge already exists
    /// - Database operation fails
    pub async fn create_follow_request(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> AppResult<FollowRequest> {
        if from_user_id == to_user_id {
            return Err(AppError::invalid_input("Users cannot follow themselves"));
        }
        if self.get_follow(from_user_id, to_user_id).await?.is_some() {
            return Err(AppError::invalid_input("Already following this user"));
        }

        let now = Utc::now();
        let request = FollowRequest {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            status: FollowRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO follow_requests (
                id, from_user_id, to_user_id, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(request.id.to_string())
        .bind(request.from_user_id.to_string())
        .bind(request.to_user_id.to_string())
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
            {
                AppError::invalid_input("Follow request already exists")
            } else {
                AppError::database(format!("Failed to create follow request: {e}"))
            }
        })?;

        let requester = username_for(&mut tx, from_user_id).await?;
        insert_notification(
            &mut tx,
            to_user_id,
            NotificationType::Follow,
            &format!("{requester} wants to follow you"),
            Some(request.id),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit follow request: {e}")))?;

        Ok(request)
    }

    /// Get a follow request by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_follow_request(&self, request_id: Uuid) -> AppResult<Option<FollowRequest>> {
        let row = sqlx::query(
            r"
            SELECT id, from_user_id, to_user_id, status, created_at, updated_at
            FROM follow_requests WHERE id = $1
            ",
        )
        .bind(request_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get follow request: {e}")))?;

        row.as_ref().map(row_to_follow_request).transpose()
    }

    /// Accept a follow request, creating the follow edge
    ///
    /// This is the only path that creates a [`Follow`]. Accepting an
    /// already-accepted request is a no-op (get-or-create semantics);
    /// accepting a rejected request is an error, the transition is one-way.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request does not exist
    /// - The request was rejected
    /// - Database operation fails
    pub async fn accept_follow_request(&self, request_id: Uuid) -> AppResult<FollowRequest> {
        let mut request = self
            .get_follow_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Follow request with ID: {request_id}")))?;

        if request.status == FollowRequestStatus::Rejected {
            return Err(AppError::invalid_input(
                "Cannot accept a rejected follow request",
            ));
        }

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE follow_requests SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(request.id.to_string())
            .bind(FollowRequestStatus::Accepted.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update follow request: {e}")))?;

        // Get-or-create keeps a duplicate accept idempotent
        sqlx::query(
            r"
            INSERT INTO follows (id, follower_id, following_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(follower_id, following_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(request.from_user_id.to_string())
        .bind(request.to_user_id.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create follow edge: {e}")))?;

        recount_follow_counters(&mut tx, request.from_user_id).await?;
        recount_follow_counters(&mut tx, request.to_user_id).await?;

        if request.status == FollowRequestStatus::Pending {
            let accepter = username_for(&mut tx, request.to_user_id).await?;
            insert_notification(
                &mut tx,
                request.from_user_id,
                NotificationType::Follow,
                &format!("{accepter} accepted your follow request"),
                Some(request.id),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit accept: {e}")))?;

        request.status = FollowRequestStatus::Accepted;
        request.updated_at = now;
        Ok(request)
    }

    /// Reject a follow request
    ///
    /// Rejecting twice is a no-op; rejecting an accepted request is an
    /// error, the transition is one-way.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request does not exist
    /// - The request was already accepted
    /// - Database operation fails
    pub async fn reject_follow_request(&self, request_id: Uuid) -> AppResult<FollowRequest> {
        let mut request = self
            .get_follow_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Follow request with ID: {request_id}")))?;

        if request.status == FollowRequestStatus::Accepted {
            return Err(AppError::invalid_input(
                "Cannot reject an accepted follow request",
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE follow_requests SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(request.id.to_string())
            .bind(FollowRequestStatus::Rejected.as_str())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update follow request: {e}")))?;

        request.status = FollowRequestStatus::Rejected;
        request.updated_at = now;
        Ok(request)
    }

    /// Get the follow edge between two users, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> AppResult<Option<Follow>> {
        let row = sqlx::query(
            r"
            SELECT id, follower_id, following_id, created_at
            FROM follows WHERE follower_id = $1 AND following_id = $2
            ",
        )
        .bind(follower_id.to_string())
        .bind(following_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get follow: {e}")))?;

        row.as_ref().map(row_to_follow).transpose()
    }

    /// Remove a follow edge and recount both users' follow counters
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist or the operation fails
    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id.to_string())
                .bind(following_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete follow: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Follow from {follower_id} to {following_id}"
            )));
        }

        recount_follow_counters(&mut tx, follower_id).await?;
        recount_follow_counters(&mut tx, following_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit unfollow: {e}")))?;

        Ok(())
    }
}

/// Recount a post's like and comment counters from the relation tables
///
/// Overwrites rather than increments, so concurrent maintainers converge
/// on the exact count after the last writer commits.
async fn recount_post_counters(conn: &mut SqliteConnection, post_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r"
        UPDATE posts SET
            likes_count = (SELECT COUNT(*) FROM likes WHERE post_id = $1),
            comments_count = (SELECT COUNT(*) FROM comments WHERE post_id = $1)
        WHERE id = $1
        ",
    )
    .bind(post_id.to_string())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to recount post counters: {e}")))?;

    Ok(())
}

/// Recount a user's follower/following counters from the follows table
async fn recount_follow_counters(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r"
        UPDATE users SET
            followers_count = (SELECT COUNT(*) FROM follows WHERE following_id = $1),
            following_count = (SELECT COUNT(*) FROM follows WHERE follower_id = $1)
        WHERE id = $1
        ",
    )
    .bind(user_id.to_string())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to recount follow counters: {e}")))?;

    Ok(())
}

/// Look up a username inside a transaction, for notification messages
async fn username_for(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<String> {
    sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
        .bind(user_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up username: {e}")))?
        .ok_or_else(|| AppError::not_found(format!("User with ID: {user_id}")))
}

/// Insert a notification row inside the caller's transaction
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    notification_type: NotificationType,
    message: &str,
    related_id: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO notifications (
            id, user_id, notification_type, message, is_read, created_at, related_id
        ) VALUES ($1, $2, $3, $4, FALSE, $5, $6)
        ",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(notification_type.as_str())
    .bind(message)
    .bind(Utc::now())
    .bind(related_id.map(|id| id.to_string()))
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to insert notification: {e}")))?;

    Ok(())
}

fn row_to_post(row: &SqliteRow) -> AppResult<Post> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    Ok(Post {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse post id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse post user UUID: {e}")))?,
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        likes_count: row.get("likes_count"),
        comments_count: row.get("comments_count"),
    })
}

fn row_to_comment(row: &SqliteRow) -> AppResult<Comment> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let post_id: String = row.get("post_id");
    Ok(Comment {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse comment id UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse comment user UUID: {e}")))?,
        post_id: Uuid::parse_str(&post_id)
            .map_err(|e| AppError::internal(format!("Failed to parse comment post UUID: {e}")))?,
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_follow(row: &SqliteRow) -> AppResult<Follow> {
    let id: String = row.get("id");
    let follower_id: String = row.get("follower_id");
    let following_id: String = row.get("following_id");
    Ok(Follow {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse follow id UUID: {e}")))?,
        follower_id: Uuid::parse_str(&follower_id)
            .map_err(|e| AppError::internal(format!("Failed to parse follower UUID: {e}")))?,
        following_id: Uuid::parse_str(&following_id)
            .map_err(|e| AppError::internal(format!("Failed to parse following UUID: {e}")))?,
        created_at: row.get("created_at"),
    })
}

fn row_to_follow_request(row: &SqliteRow) -> AppResult<FollowRequest> {
    let id: String = row.get("id");
    let from_user_id: String = row.get("from_user_id");
    let to_user_id: String = row.get("to_user_id");
    let status: String = row.get("status");
    Ok(FollowRequest {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse request id UUID: {e}")))?,
        from_user_id: Uuid::parse_str(&from_user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse requester UUID: {e}")))?,
        to_user_id: Uuid::parse_str(&to_user_id)
            .map_err(|e| AppError::internal(format!("Failed to parse requestee UUID: {e}")))?,
        status: FollowRequestStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
