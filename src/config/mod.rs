// ABOUTME: Configuration management for the Stride server
// ABOUTME: Environment-only configuration, no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Environment-based server configuration
pub mod environment;

pub use environment::{GamificationConfig, ServerConfig};
