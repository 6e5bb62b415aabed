// src/refresh.rs
//! Periodic background refresh, one task per (data kind, wallet)

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshKind {
    /// Wallet balance and supply
    TokenData,
    /// Holder and market stats
    TokenStats,
    Profile,
    Stakes,
}

impl RefreshKind {
    pub fn default_period(&self) -> Duration {
        match self {
            RefreshKind::TokenData => Duration::from_secs(10),
            RefreshKind::TokenStats | RefreshKind::Profile | RefreshKind::Stakes => {
                Duration::from_secs(30)
            }
        }
    }
}

type TaskKey = (RefreshKind, String);

/// Owns the repeating refresh tasks. Dropping the scheduler cancels all of them.
#[derive(Default)]
pub struct RefreshScheduler {
    tasks: Mutex<HashMap<TaskKey, JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` now and then every `period` until cancelled. Replaces any
    /// task already scheduled for the same kind and owner.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, kind: RefreshKind, owner: &str, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                task().await;
            }
        });

        let previous = self.tasks.lock().insert((kind, owner.to_string()), handle);
        if let Some(previous) = previous {
            log::debug!("Replacing {:?} refresh for {}", kind, owner);
            previous.abort();
        }
    }

    pub fn cancel(&self, kind: RefreshKind, owner: &str) -> bool {
        match self.tasks.lock().remove(&(kind, owner.to_string())) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every refresh tied to `owner`; returns how many were stopped
    pub fn cancel_owner(&self, owner: &str) -> usize {
        let mut tasks = self.tasks.lock();
        let keys: Vec<TaskKey> = tasks.keys().filter(|(_, o)| o == owner).cloned().collect();
        for key in &keys {
            if let Some(handle) = tasks.remove(key) {
                handle.abort();
            }
        }
        keys.len()
    }

    pub fn cancel_all(&self) {
        for (_, handle) in self.tasks.lock().drain() {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self, kind: RefreshKind, owner: &str) -> bool {
        self.tasks.lock().contains_key(&(kind, owner.to_string()))
    }

    pub fn active_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
