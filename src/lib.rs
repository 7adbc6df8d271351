// ABOUTME: Main library entry point for the Stride fitness platform
// ABOUTME: Social fitness tracking with workout gamification and leaderboards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![deny(unsafe_code)]

//! # Stride Fitness Server
//!
//! Backend for a social fitness-tracking service: workout and daily
//! activity logging layered over a relational schema, with a gamification
//! subsystem (streaks, points, challenges) and a cached leaderboard.
//!
//! ## Architecture
//!
//! - **Models**: Common data structures for users, workouts, and the
//!   social graph
//! - **Database**: SQLite persistence with per-concern operation modules
//! - **Gamification**: Streak/points calculators and the completion and
//!   challenge-progress orchestration that owns all score mutation
//! - **Cache**: Pluggable leaderboard cache, invalidated on ledger writes
//! - **Routes**: Thin REST surface that triggers the services above
//!
//! ## Example
//!
//! ```rust,no_run
//! use stride_server::config::ServerConfig;
//! use stride_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Stride server configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Cache abstraction for the leaderboard read view
pub mod cache;

/// Configuration management
pub mod config;

/// Application constants and default configuration values
pub mod constants;

/// Database management and per-concern operations
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Gamification subsystem: streaks, points, completion, challenge progress
pub mod gamification;

/// Leaderboard read views over the score ledger
pub mod leaderboard;

/// Production logging and structured output
pub mod logging;

/// Common data models
pub mod models;

/// `HTTP` routes and shared server resources
pub mod routes;
