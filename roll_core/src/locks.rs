//! Per-actor mutation queue

use sheet_core::ActorId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes read-modify-write passes over the same actor
///
/// Waiters are served in arrival order, so concurrent triggers on one actor
/// run one after another while other actors proceed freely.
#[derive(Debug, Default)]
pub struct ActorLocks {
    locks: Mutex<HashMap<ActorId, Arc<Mutex<()>>>>,
}

impl ActorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for this actor's turn; the turn ends when the guard drops
    ///
    /// Entries nobody holds or waits on are pruned here, so the map only
    /// grows with the number of actors in flight.
    pub async fn acquire(&self, actor: &ActorId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(actor.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_same_actor_waits() {
        let locks = Arc::new(ActorLocks::new());
        let id = ActorId::from("a1");
        let guard = locks.acquire(&id).await;

        let entered = Arc::new(AtomicUsize::new(0));
        let task = {
            let locks = Arc::clone(&locks);
            let entered = Arc::clone(&entered);
            let id = id.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
                entered.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::task::yield_now().await;
        assert_eq!(entered.load(Ordering::SeqCst), 0);
        drop(guard);
        task.await.unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_actors_do_not_wait() {
        let locks = ActorLocks::new();
        let _a = locks.acquire(&ActorId::from("a1")).await;
        let _b = locks.acquire(&ActorId::from("a2")).await;
    }

    #[tokio::test]
    async fn test_released_actors_are_pruned() {
        let locks = ActorLocks::new();
        for n in 0..50 {
            let id = ActorId::from(format!("actor-{n}").as_str());
            drop(locks.acquire(&id).await);
        }

        let held = locks.acquire(&ActorId::from("a1")).await;
        let other = locks.acquire(&ActorId::from("a2")).await;
        assert_eq!(locks.locks.lock().await.len(), 2);

        drop(held);
        drop(other);
        let _again = locks.acquire(&ActorId::from("a1")).await;
        let tracked: Vec<ActorId> = locks.locks.lock().await.keys().cloned().collect();
        assert_eq!(tracked, vec![ActorId::from("a1")]);
    }
}
