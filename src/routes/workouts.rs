// ABOUTME: Workout session, plan, and daily-activity route handlers
// ABOUTME: Completion and activity upserts trigger the gamification services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::ServerResources;
use crate::errors::AppError;
use crate::models::{DailyActivity, Difficulty, WorkoutPlan, WorkoutSession};

/// Default page size for session listings
const DEFAULT_SESSION_LIMIT: usize = 50;

/// Payload for starting a workout session
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Owning user
    pub user_id: Uuid,
    /// Session name
    pub name: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Start time; defaults to now
    pub start_time: Option<DateTime<Utc>>,
    /// Optional plan reference
    pub workout_plan_id: Option<Uuid>,
    /// Calories burned, when tracked by the client
    pub calories_burned: Option<f64>,
}

/// Payload for completing a session
#[derive(Debug, Default, Deserialize)]
pub struct CompleteSessionRequest {
    /// End time; defaults to the stored end time, then to now
    pub end_time: Option<DateTime<Utc>>,
}

/// Payload for upserting a day's activity metrics
#[derive(Debug, Deserialize)]
pub struct UpsertActivityRequest {
    /// Step count for the day
    pub steps: i64,
    /// Distance in kilometres
    pub distance: f64,
    /// Calories burned
    #[serde(default)]
    pub calories_burned: f64,
    /// Minutes of activity
    #[serde(default)]
    pub active_minutes: i64,
}

/// Payload for creating a workout plan
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    /// Owning user
    pub user_id: Uuid,
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Whether other users can see the plan
    #[serde(default)]
    pub is_public: bool,
}

/// Completion response: the session plus the award breakdown
#[derive(Debug, Serialize)]
struct CompletionResponse {
    session: WorkoutSession,
    base_points: i64,
    streak_bonus: i64,
    current_streak: i32,
    newly_completed: bool,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

/// Workout routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/workouts", post(Self::handle_create_session))
            .route("/api/workouts/:id", get(Self::handle_get_session))
            .route(
                "/api/workouts/:id/complete",
                post(Self::handle_complete_session),
            )
            .route("/api/users/:id/workouts", get(Self::handle_list_sessions))
            .route(
                "/api/users/:id/activity/:date",
                put(Self::handle_upsert_activity),
            )
            .route("/api/workout-plans", post(Self::handle_create_plan))
            .route("/api/workout-plans/:id", get(Self::handle_get_plan))
            .with_state(resources)
    }

    /// Start a workout session
    async fn handle_create_session(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateSessionRequest>,
    ) -> Result<Response, AppError> {
        resources.db.get_user_required(request.user_id).await?;

        let mut session = WorkoutSession::start(
            request.user_id,
            request.name,
            request.start_time.unwrap_or_else(Utc::now),
        );
        session.notes = request.notes;
        session.workout_plan_id = request.workout_plan_id;
        session.calories_burned = request.calories_burned.unwrap_or(0.0);

        resources.db.create_workout_session(&session).await?;
        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    /// Read a workout session
    async fn handle_get_session(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let session = resources
            .db
            .get_workout_session_required(session_id)
            .await?;
        Ok((StatusCode::OK, Json(session)).into_response())
    }

    /// Complete a workout session, triggering points and streak accrual
    ///
    /// Idempotent: completing twice returns the stored award unchanged.
    async fn handle_complete_session(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        request: Option<Json<CompleteSessionRequest>>,
    ) -> Result<Response, AppError> {
        let end_time = request.and_then(|Json(r)| r.end_time);
        let outcome = resources
            .completion
            .complete_session(session_id, end_time)
            .await?;

        let response = CompletionResponse {
            session: outcome.session,
            base_points: outcome.base_points,
            streak_bonus: outcome.streak_bonus,
            current_streak: outcome.current_streak,
            newly_completed: outcome.newly_completed,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// List a user's workout sessions, most recent first
    async fn handle_list_sessions(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<Uuid>,
        Query(params): Query<LimitParams>,
    ) -> Result<Response, AppError> {
        let limit = params.limit.unwrap_or(DEFAULT_SESSION_LIMIT);
        let sessions = resources.db.list_workout_sessions(user_id, limit).await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    /// Upsert a day's activity metrics, triggering challenge recomputation
    async fn handle_upsert_activity(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, date)): Path<(Uuid, NaiveDate)>,
        Json(request): Json<UpsertActivityRequest>,
    ) -> Result<Response, AppError> {
        if request.steps < 0 || request.distance < 0.0 {
            return Err(AppError::invalid_input(
                "Steps and distance must be non-negative",
            ));
        }
        resources.db.get_user_required(user_id).await?;

        let activity = resources
            .db
            .upsert_daily_activity(&DailyActivity {
                id: Uuid::new_v4(),
                user_id,
                date,
                steps: request.steps,
                distance: request.distance,
                calories_burned: request.calories_burned,
                active_minutes: request.active_minutes,
            })
            .await?;

        let progress = resources.aggregator.on_daily_activity(user_id, date).await?;

        Ok((
            StatusCode::OK,
            Json(json!({ "activity": activity, "challenge_progress": progress })),
        )
            .into_response())
    }

    /// Create a workout plan
    async fn handle_create_plan(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreatePlanRequest>,
    ) -> Result<Response, AppError> {
        resources.db.get_user_required(request.user_id).await?;

        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            name: request.name,
            description: request.description,
            difficulty: request.difficulty,
            is_public: request.is_public,
            created_at: Utc::now(),
        };

        resources.db.create_workout_plan(&plan).await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    /// Read a workout plan
    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let plan = resources
            .db
            .get_workout_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workout plan with ID: {plan_id}")))?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }
}
