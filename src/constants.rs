// ABOUTME: Application constants and default configuration values
// ABOUTME: Gamification rates, cache keys, and server defaults live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Default HTTP port for the server binary
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default database URL when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/stride.db";

/// Points awarded per minute of completed workout time
pub const DEFAULT_POINTS_PER_MINUTE: i64 = 2;

/// Bonus points per full week of streak, awarded when the streak
/// reaches a multiple of 7 on a workout completion
pub const DEFAULT_STREAK_BONUS_POINTS: i64 = 50;

/// One-time bonus awarded when a challenge target is reached
pub const DEFAULT_CHALLENGE_COMPLETION_POINTS: i64 = 100;

/// Number of entries served by the global leaderboard
pub const DEFAULT_LEADERBOARD_SIZE: usize = 50;

/// Cache key for the global leaderboard read view
pub const GLOBAL_LEADERBOARD_CACHE_KEY: &str = "global_leaderboard";

/// Length of a streak week, the bonus interval
pub const STREAK_WEEK_DAYS: i64 = 7;
