// ABOUTME: Gamification subsystem: streaks, points, completion, challenge progress
// ABOUTME: Owns all mutation of user score and streak state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Challenge progress aggregation
pub mod challenges;
/// Workout completion orchestration
pub mod completion;
/// Per-user lock registry for serializing score mutations
pub mod locks;
/// Pure points calculations
pub mod points;
/// Pure streak calculation
pub mod streak;

pub use challenges::ChallengeProgressAggregator;
pub use completion::{CompletionOutcome, WorkoutCompletionHandler};
pub use locks::UserLockRegistry;
