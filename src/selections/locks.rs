use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Per-user advisory locks. A mutation on the pair {A,B} holds both
/// users' locks for the whole insert/check/materialize sequence, so
/// symmetric selects serialize against each other and two tabs of the
/// same chooser serialize on the chooser's lock, while disjoint pairs
/// never contend.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Idle entries are swept once the map reaches this size, keeping it
/// bounded by the number of concurrently locked users rather than
/// every user ever seen.
const SWEEP_THRESHOLD: usize = 256;

pub struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, user: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        if map.len() >= SWEEP_THRESHOLD {
            // entries only the map still references are uncontended
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        map.entry(user).or_default().clone()
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Always acquires in sorted id order, so crossing lock_pair(a, b)
    /// and lock_pair(b, a) cannot deadlock.
    pub async fn lock_pair(&self, a: Uuid, b: Uuid) -> PairGuard {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let first = self.lock_for(lo).lock_owned().await;
        let second = if lo == hi {
            None
        } else {
            Some(self.lock_for(hi).lock_owned().await)
        };
        PairGuard {
            _first: first,
            _second: second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn overlapping_pairs_are_mutually_exclusive() {
        let locks = UserLocks::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let in_section = Arc::new(AtomicU32::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_section = in_section.clone();
            tasks.push(tokio::spawn(async move {
                // half the tasks take the pair reversed
                let _guard = locks.lock_pair(b, a).await;
                assert_eq!(in_section.fetch_add(1, Ordering::SeqCst), 0);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn idle_entries_swept_instead_of_accumulating() {
        let locks = UserLocks::new();
        for _ in 0..2 * SWEEP_THRESHOLD {
            let _guard = locks.lock_pair(Uuid::now_v7(), Uuid::now_v7()).await;
        }
        assert!(locks.entry_count() <= SWEEP_THRESHOLD + 2);
    }

    #[tokio::test]
    async fn held_locks_survive_the_sweep() {
        let locks = UserLocks::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let _held = locks.lock_pair(a, b).await;

        for _ in 0..2 * SWEEP_THRESHOLD {
            let _guard = locks.lock_pair(Uuid::now_v7(), Uuid::now_v7()).await;
        }

        // a contender for the held pair still queues behind the holder
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock_pair(a, b).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(_held);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn disjoint_pairs_do_not_block() {
        let locks = UserLocks::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let (c, d) = (Uuid::now_v7(), Uuid::now_v7());

        let _held = locks.lock_pair(a, b).await;
        // must complete while {a,b} is held
        tokio::time::timeout(Duration::from_secs(1), locks.lock_pair(c, d))
            .await
            .expect("disjoint pair blocked on unrelated lock");
    }
}
