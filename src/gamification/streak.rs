// ABOUTME: Pure streak calculation from last-activity timestamp and current date
// ABOUTME: No I/O; persistence happens in the caller's transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, Days, Utc};

/// Streak fields as currently persisted on the user
#[derive(Debug, Clone, Copy)]
pub struct StreakState {
    /// Timestamp of the most recent qualifying activity, if any
    pub last_activity: Option<DateTime<Utc>>,
    /// Consecutive-day streak as of `last_activity`
    pub current_streak: i32,
    /// Longest streak ever reached
    pub longest_streak: i32,
}

/// Result of advancing a streak to `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// New consecutive-day streak
    pub current_streak: i32,
    /// New longest streak, `max(previous longest, current)`
    pub longest_streak: i32,
    /// Whether anything changed; false when activity was already
    /// recorded today and the call is an idempotent no-op
    pub changed: bool,
}

/// Advance a streak for a qualifying activity happening at `now`
///
/// Rules, comparing the calendar date of `last_activity` with today:
/// - no prior activity: streak becomes 1
/// - last activity today: no-op, streak unchanged
/// - last activity yesterday: streak increments
/// - gap of two days or more: streak resets to 1
///
/// `longest_streak` tracks the maximum on every non-no-op path, so
/// `current_streak <= longest_streak` holds from the very first activity.
#[must_use]
pub fn advance(state: &StreakState, now: DateTime<Utc>) -> StreakUpdate {
    let today = now.date_naive();

    let current = match state.last_activity {
        Some(last) => {
            let last_date = last.date_naive();
            if last_date == today {
                return StreakUpdate {
                    current_streak: state.current_streak,
                    longest_streak: state.longest_streak,
                    changed: false,
                };
            }
            let yesterday = today.checked_sub_days(Days::new(1));
            if Some(last_date) == yesterday {
                state.current_streak + 1
            } else {
                1
            }
        }
        None => 1,
    };

    StreakUpdate {
        current_streak: current,
        longest_streak: state.longest_streak.max(current),
        changed: true,
    }
}
