//! Per-object mutual exclusion in arrival order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot::{self, error::TryRecvError};

/// Serializes operations on the same logical path in the order their
/// turns were taken.
///
/// [`ObjectLocks::enqueue`] is synchronous, so callers that take turns
/// one after another keep that order even when the operations later run
/// concurrently. Operations on different paths never wait on each other.
#[derive(Default)]
pub struct ObjectLocks {
    /// Completion signal of the most recent turn per path
    tails: Mutex<HashMap<String, oneshot::Receiver<Handoff>>>,
}

/// Sent by a turn dropped before it got the path: the signal it was
/// still waiting on, which its successor must wait on instead.
struct Handoff(Option<oneshot::Receiver<Handoff>>);

/// A place in the queue for one path. Waiting on it yields a
/// [`PathGuard`] once every earlier turn on the path has finished.
///
/// A turn dropped before its wait completes keeps its place in the
/// chain: later turns still wait for the turns ahead of it.
pub struct Turn {
    previous: Option<oneshot::Receiver<Handoff>>,
    done: Option<oneshot::Sender<Handoff>>,
}

/// Exclusive access to a path; the next turn proceeds when this drops.
pub struct PathGuard {
    _done: Option<oneshot::Sender<Handoff>>,
}

impl Turn {
    pub async fn wait(mut self) -> PathGuard {
        while let Some(previous) = self.previous.as_mut() {
            self.previous = match previous.await {
                Ok(Handoff(next)) => next,
                Err(_) => None,
            };
        }
        PathGuard {
            _done: self.done.take(),
        }
    }
}

impl Drop for Turn {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(Handoff(self.previous.take()));
        }
    }
}

/// Whether the turn behind `tail` still holds or awaits its path.
fn pending(tail: &mut oneshot::Receiver<Handoff>) -> bool {
    loop {
        match tail.try_recv() {
            Err(TryRecvError::Empty) => return true,
            Ok(Handoff(Some(next))) => *tail = next,
            Ok(Handoff(None)) | Err(TryRecvError::Closed) => return false,
        }
    }
}

impl ObjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next turn on `logical_path` behind every turn already taken.
    pub fn enqueue(&self, logical_path: &str) -> Turn {
        let (done, tail) = oneshot::channel();
        let mut tails = self.tails.lock().unwrap_or_else(PoisonError::into_inner);
        tails.retain(|_, tail| pending(tail));
        let previous = tails.insert(logical_path.to_string(), tail);
        Turn {
            previous,
            done: Some(done),
        }
    }

    /// Wait for exclusive access to `logical_path`.
    pub async fn acquire(&self, logical_path: &str) -> PathGuard {
        self.enqueue(logical_path).wait().await
    }

    /// Number of paths with a held or awaited turn.
    pub fn active(&self) -> usize {
        self.tails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values_mut()
            .map(pending)
            .filter(|&held| held)
            .count()
    }
}
