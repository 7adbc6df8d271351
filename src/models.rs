// ABOUTME: Common data models for users, workouts, challenges, and the social graph
// ABOUTME: Pure data types; persistence mapping lives in the database modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// A registered user with profile and gamification state
///
/// The gamification fields (`last_activity`, `current_streak`,
/// `longest_streak`, `total_points`) are owned by the gamification
/// subsystem and must only be mutated through it. The follow counters
/// are denormalized and maintained by recount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email address (unique)
    pub email: String,
    /// Public handle (unique)
    pub username: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Optional profile bio
    pub bio: Option<String>,
    /// Whether the account is active
    pub is_active: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent qualifying activity
    pub last_activity: Option<DateTime<Utc>>,
    /// Consecutive calendar days with at least one completed activity
    pub current_streak: i32,
    /// Longest streak ever reached
    pub longest_streak: i32,
    /// Cumulative points, mirrors the score ledger
    pub total_points: i64,
    /// Denormalized follower count
    pub followers_count: i64,
    /// Denormalized following count
    pub following_count: i64,
}

impl User {
    /// Create a new user with empty gamification state
    #[must_use]
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            display_name: None,
            bio: None,
            is_active: true,
            created_at: Utc::now(),
            last_activity: None,
            current_streak: 0,
            longest_streak: 0,
            total_points: 0,
            followers_count: 0,
            following_count: 0,
        }
    }
}

/// Per-user score ledger entry, one-to-one with [`User`]
///
/// `points` only increases; `workouts_completed` increments exactly once
/// per completed workout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserScore {
    /// Owning user
    pub user_id: Uuid,
    /// Cumulative points
    pub points: i64,
    /// Number of completed workout sessions
    pub workouts_completed: i64,
    /// Timestamp of the most recent ledger write
    pub last_updated: DateTime<Utc>,
}

/// Difficulty rating for a workout plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Suitable for newcomers
    Beginner,
    /// Some training history assumed
    Intermediate,
    /// Experienced athletes
    Advanced,
}

impl Difficulty {
    /// String form used for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(AppError::invalid_input(format!(
                "Unknown difficulty: {other}"
            ))),
        }
    }
}

/// A reusable workout plan owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Whether other users can see the plan
    pub is_public: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A single workout session
///
/// `is_completed` transitions false→true exactly once; `points_earned`
/// is set at completion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Optional plan the session was started from
    pub workout_plan_id: Option<Uuid>,
    /// Session name
    pub name: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// When the session ended; None until completion
    pub end_time: Option<DateTime<Utc>>,
    /// Calories burned during the session
    pub calories_burned: f64,
    /// Points awarded at completion (base + any streak bonus)
    pub points_earned: i64,
    /// Terminal completion flag
    pub is_completed: bool,
}

impl WorkoutSession {
    /// Start a new incomplete session now
    #[must_use]
    pub fn start(user_id: Uuid, name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            workout_plan_id: None,
            name: name.into(),
            notes: None,
            start_time,
            end_time: None,
            calories_burned: 0.0,
            points_earned: 0,
            is_completed: false,
        }
    }
}

/// One row of daily step/distance tracking, unique per (user, date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivity {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Calendar date the row covers
    pub date: NaiveDate,
    /// Step count
    pub steps: i64,
    /// Distance in kilometres
    pub distance: f64,
    /// Calories burned
    pub calories_burned: f64,
    /// Minutes of activity
    pub active_minutes: i64,
}

/// Metric a challenge measures progress against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeTargetType {
    /// Count of completed workout sessions in the window
    Workouts,
    /// Sum of daily steps in the window
    Steps,
    /// Sum of daily distance (km) in the window
    Distance,
    /// Sum of workout points earned in the window
    Points,
}

impl ChallengeTargetType {
    /// String form used for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workouts => "workouts",
            Self::Steps => "steps",
            Self::Distance => "distance",
            Self::Points => "points",
        }
    }
}

impl FromStr for ChallengeTargetType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workouts" => Ok(Self::Workouts),
            "steps" => Ok(Self::Steps),
            "distance" => Ok(Self::Distance),
            "points" => Ok(Self::Points),
            other => Err(AppError::invalid_input(format!(
                "Unknown challenge target type: {other}"
            ))),
        }
    }
}

/// A time-boxed challenge with a numeric target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Unique identifier
    pub id: Uuid,
    /// Challenge name
    pub name: String,
    /// Description shown to participants
    pub description: String,
    /// First day contributions count (inclusive)
    pub start_date: NaiveDate,
    /// Last day contributions count (inclusive)
    pub end_date: NaiveDate,
    /// Numeric target to reach
    pub target: i64,
    /// Metric the target is measured in
    pub target_type: ChallengeTargetType,
    /// User who created the challenge
    pub created_by: Uuid,
    /// Whether the challenge currently accrues progress
    pub is_active: bool,
}

impl Challenge {
    /// Whether `date` falls inside the challenge window
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Progress of one user toward one challenge, unique per pair
///
/// `progress` is recomputed from source records, never incremented.
/// `completed` is monotonic: recomputation never reverts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// Unique identifier
    pub id: Uuid,
    /// Participating user
    pub user_id: Uuid,
    /// Challenge the progress belongs to
    pub challenge_id: Uuid,
    /// Current progress toward the target
    pub progress: f64,
    /// Whether the target has been reached
    pub completed: bool,
    /// When the target was first reached
    pub completed_at: Option<DateTime<Utc>>,
}

/// A social feed post with denormalized counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Post body
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp
    pub updated_at: DateTime<Utc>,
    /// Denormalized like count, maintained by recount
    pub likes_count: i64,
    /// Denormalized comment count, maintained by recount
    pub comments_count: i64,
}

/// A like on a post, unique per (user, post)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    /// Unique identifier
    pub id: Uuid,
    /// Liking user
    pub user_id: Uuid,
    /// Liked post
    pub post_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: Uuid,
    /// Commenting user
    pub user_id: Uuid,
    /// Commented post
    pub post_id: Uuid,
    /// Comment body
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp
    pub updated_at: DateTime<Utc>,
}

/// A follow edge in the social graph, unique per pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    /// Unique identifier
    pub id: Uuid,
    /// User doing the following
    pub follower_id: Uuid,
    /// User being followed
    pub following_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowRequestStatus {
    /// Awaiting a decision from the recipient
    Pending,
    /// Accepted; a follow edge exists
    Accepted,
    /// Rejected; terminal
    Rejected,
}

impl FollowRequestStatus {
    /// String form used for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for FollowRequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::invalid_input(format!(
                "Unknown follow request status: {other}"
            ))),
        }
    }
}

/// A pending/settled request to follow another user
///
/// `accept()` is the only path that creates a [`Follow`] edge; the
/// pending→accepted/rejected transition is one-way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Requesting user
    pub from_user_id: Uuid,
    /// Requested user
    pub to_user_id: Uuid,
    /// Current lifecycle state
    pub status: FollowRequestStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp
    pub updated_at: DateTime<Utc>,
}

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// New follower or follow request
    Follow,
    /// Someone liked a post
    Like,
    /// Someone commented on a post
    Comment,
    /// Challenge progress update or completion
    Challenge,
    /// Workout-related notice
    Workout,
}

impl NotificationType {
    /// String form used for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Challenge => "challenge",
            Self::Workout => "workout",
        }
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(Self::Follow),
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            "challenge" => Ok(Self::Challenge),
            "workout" => Ok(Self::Workout),
            other => Err(AppError::invalid_input(format!(
                "Unknown notification type: {other}"
            ))),
        }
    }
}

/// A notification delivered to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Category
    pub notification_type: NotificationType,
    /// Display message
    pub message: String,
    /// Whether the recipient has read it
    pub is_read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Optional id of the entity the notification refers to
    pub related_id: Option<Uuid>,
}

/// One row of the leaderboard read view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Ranked user
    pub user_id: Uuid,
    /// Ranked user's handle
    pub username: String,
    /// Cumulative points from the score ledger
    pub points: i64,
    /// Completed workout count
    pub workouts_completed: i64,
}
