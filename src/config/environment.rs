// ABOUTME: Environment variable based configuration loading
// ABOUTME: ServerConfig::from_env() is the single configuration entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use std::env;

use crate::constants::{
    DEFAULT_CHALLENGE_COMPLETION_POINTS, DEFAULT_DATABASE_URL, DEFAULT_HTTP_PORT,
    DEFAULT_LEADERBOARD_SIZE, DEFAULT_POINTS_PER_MINUTE, DEFAULT_STREAK_BONUS_POINTS,
};
use crate::errors::{AppError, AppResult};

/// Tunables for the gamification subsystem
///
/// All rates are fixed for the lifetime of the process; changing a rate
/// never rewrites previously awarded points.
#[derive(Debug, Clone)]
pub struct GamificationConfig {
    /// Points awarded per minute of completed workout time
    pub points_per_minute: i64,
    /// Bonus points per full streak week
    pub streak_bonus_points: i64,
    /// One-time bonus for reaching a challenge target
    pub challenge_completion_points: i64,
    /// Number of entries in the global leaderboard
    pub leaderboard_size: usize,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            points_per_minute: DEFAULT_POINTS_PER_MINUTE,
            streak_bonus_points: DEFAULT_STREAK_BONUS_POINTS,
            challenge_completion_points: DEFAULT_CHALLENGE_COMPLETION_POINTS,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

/// Top-level server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Gamification tunables
    pub gamification: GamificationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables:
    /// - `STRIDE_HTTP_PORT` (default 8081)
    /// - `DATABASE_URL` (default `sqlite:./data/stride.db`)
    /// - `STRIDE_POINTS_PER_MINUTE`
    /// - `STRIDE_STREAK_BONUS_POINTS`
    /// - `STRIDE_CHALLENGE_COMPLETION_POINTS`
    /// - `STRIDE_LEADERBOARD_SIZE`
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse as its expected type
    pub fn from_env() -> AppResult<Self> {
        let http_port = parse_env("STRIDE_HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let gamification = GamificationConfig {
            points_per_minute: parse_env("STRIDE_POINTS_PER_MINUTE", DEFAULT_POINTS_PER_MINUTE)?,
            streak_bonus_points: parse_env(
                "STRIDE_STREAK_BONUS_POINTS",
                DEFAULT_STREAK_BONUS_POINTS,
            )?,
            challenge_completion_points: parse_env(
                "STRIDE_CHALLENGE_COMPLETION_POINTS",
                DEFAULT_CHALLENGE_COMPLETION_POINTS,
            )?,
            leaderboard_size: parse_env("STRIDE_LEADERBOARD_SIZE", DEFAULT_LEADERBOARD_SIZE)?,
        };

        Ok(Self {
            http_port,
            database_url,
            gamification,
        })
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = GamificationConfig::default();
        assert_eq!(config.points_per_minute, 2);
        assert_eq!(config.streak_bonus_points, 50);
        assert_eq!(config.challenge_completion_points, 100);
        assert_eq!(config.leaderboard_size, 50);
    }
}
