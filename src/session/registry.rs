// ABOUTME: Registry mapping interactive session ids to their session stores
// ABOUTME: Per-session flow guard, idle tracking, and periodic eviction of stale sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::InMemorySessionStore;
use crate::errors::AuthError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// One interactive context: its session store and the lock serializing sign-in
#[derive(Debug)]
pub struct SessionHandle {
    store: InMemorySessionStore,
    flow_guard: Mutex<()>,
    last_seen: StdMutex<DateTime<Utc>>,
    denial: StdMutex<Option<AuthError>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self {
            store: InMemorySessionStore::new(),
            flow_guard: Mutex::new(()),
            last_seen: StdMutex::new(Utc::now()),
            denial: StdMutex::new(None),
        }
    }
}

impl SessionHandle {
    /// Session store for this context
    #[must_use]
    pub const fn store(&self) -> &InMemorySessionStore {
        &self.store
    }

    /// Wait for exclusive use of the sign-in flow for this context
    pub async fn lock_flow(&self) -> MutexGuard<'_, ()> {
        self.flow_guard.lock().await
    }

    /// Last time a request used this context
    #[must_use]
    pub fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    /// Remember why the latest sign-in attempt failed, or forget it with `None`
    pub fn record_denial(&self, reason: Option<AuthError>) {
        *self.denial.lock().unwrap_or_else(PoisonError::into_inner) = reason;
    }

    /// Reason the latest sign-in attempt failed, until a later attempt or logout
    #[must_use]
    pub fn last_denial(&self) -> Option<AuthError> {
        self.denial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Session id to [`SessionHandle`] map
///
/// `DashMap` shards the map so unrelated sessions never contend. Entries are
/// only added once a context has state worth keeping, and idle entries are
/// dropped by [`SessionRegistry::evict_idle`].
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session by id and mark it as used
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<Arc<SessionHandle>> {
        let handle = self.sessions.get(id).map(|entry| Arc::clone(entry.value()))?;
        handle.touch();
        Some(handle)
    }

    /// Register a handle under a fresh id
    pub fn insert(&self, handle: Arc<SessionHandle>) -> Uuid {
        let id = Uuid::new_v4();
        handle.touch();
        self.sessions.insert(id, handle);
        id
    }

    /// Forget a session entirely
    pub fn remove(&self, id: &Uuid) -> Option<Arc<SessionHandle>> {
        self.sessions.remove(id).map(|(_, handle)| handle)
    }

    /// Drop every session unused for longer than `max_idle`, returning how many went
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut evicted = 0;
        self.sessions.retain(|_, handle| {
            let keep = handle.last_seen() > cutoff;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Run [`Self::evict_idle`] every `every` on the tokio runtime
    #[must_use]
    pub fn spawn_idle_sweeper(
        &self,
        every: std::time::Duration,
        max_idle: Duration,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    debug!(evicted, remaining = registry.len(), "Evicted idle sessions");
                }
            }
        })
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no sessions exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
