// ABOUTME: Keyed per-user mutex registry
// ABOUTME: Guarantees at most one in-flight mutation of a user's score/streak state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-user lock registry
///
/// Two workout completions racing for the same user would otherwise lose
/// updates on `points` and `current_streak`; callers must hold the user's
/// lock across the whole read-compute-write sequence. Locks for distinct
/// users are independent.
#[derive(Debug, Default)]
pub struct UserLockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl UserLockRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `user_id`, creating it on first use
    pub async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
