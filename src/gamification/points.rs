// ABOUTME: Pure points calculations for workouts and streak bonuses
// ABOUTME: Rates come from GamificationConfig; no I/O here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use crate::constants::STREAK_WEEK_DAYS;

/// Base points for a completed workout: `floor(duration * rate)`
///
/// Durations are validated non-negative upstream; a negative value (clock
/// skew between start and end) awards zero rather than deducting points.
#[must_use]
pub fn workout_points(duration_minutes: f64, points_per_minute: i64) -> i64 {
    let raw = (duration_minutes * points_per_minute as f64).floor() as i64;
    raw.max(0)
}

/// Weekly streak bonus: `bonus_per_week * (streak / 7)` when the streak
/// is a positive multiple of 7, zero otherwise
///
/// Awarded once per qualifying workout completion, not once per day.
#[must_use]
pub fn streak_bonus(current_streak: i32, bonus_per_week: i64) -> i64 {
    let streak = i64::from(current_streak);
    if streak > 0 && streak % STREAK_WEEK_DAYS == 0 {
        bonus_per_week * (streak / STREAK_WEEK_DAYS)
    } else {
        0
    }
}
