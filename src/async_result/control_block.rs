use std::any::Any;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use crate::async_result::api::{AsyncResultBase, AsyncStatus};
use crate::util::assert;

/// Type-erased result value. Dropping the box runs the value's destructor.
pub(crate) type ErasedResult = Box<dyn Any + Send + Sync>;

pub(crate) type CompletionCallback = Box<dyn FnOnce(&AsyncResultBase) + Send + 'static>;

/// Consistent view of the scalar fields of a control block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub status: AsyncStatus,
    pub error: i32,
    pub error_message: String,
}

/// How a wait on the block ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Settled {
    Complete,
    /// The completer was dropped without completing; the block stays pending forever.
    Abandoned,
    TimedOut,
}

struct State {
    status: AsyncStatus,
    error: i32,
    error_message: String,
    abandoned: bool,
    callbacks: Vec<CompletionCallback>,
    wakers: Vec<(u64, Waker)>,
    next_waker_key: u64,
}

impl State {
    fn settled(&self) -> Option<Settled> {
        if self.status == AsyncStatus::Complete {
            Some(Settled::Complete)
        } else if self.abandoned {
            Some(Settled::Abandoned)
        } else {
            None
        }
    }

    fn forget_waker(&mut self, key: u64) {
        self.wakers.retain(|(registered, _)| *registered != key);
    }
}

/// Shared state behind every handle and the completer bound to it.
///
/// All fields are guarded by one mutex. The result lives in a `OnceLock` so that readers can borrow
/// it without holding the lock; it is written inside the completing critical section, before the
/// status flips, and is only handed out once the status reads `Complete`.
///
/// Blocking waiters park on `settled_cv` and async waiters keep a keyed waker in the state, so
/// neither leaves anything behind when it gives up.
pub(crate) struct ControlBlock {
    state: Mutex<State>,
    settled_cv: Condvar,
    result: OnceLock<ErasedResult>,
}

impl ControlBlock {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                status: AsyncStatus::Pending,
                error: 0,
                error_message: String::new(),
                abandoned: false,
                callbacks: Vec::new(),
                wakers: Vec::new(),
                next_waker_key: 0,
            }),
            settled_cv: Condvar::new(),
            result: OnceLock::new(),
        }
    }

    // Callbacks never run under the lock, so poisoning would need a panic in this module's own
    // short critical sections; the data is still consistent in that case.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn status(&self) -> AsyncStatus {
        self.lock().status
    }

    pub(crate) fn error(&self) -> i32 {
        self.lock().error
    }

    pub(crate) fn error_message(&self) -> String {
        self.lock().error_message.clone()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            status: state.status,
            error: state.error,
            error_message: state.error_message.clone(),
        }
    }

    pub(crate) fn result(&self) -> Option<&(dyn Any + Send + Sync)> {
        if self.status() != AsyncStatus::Complete {
            return None;
        }
        self.result.get().map(|value| value.as_ref())
    }

    /// Resolve the block and dispatch every pending callback in registration order.
    ///
    /// Completing a block that is not pending is a fatal programmer error. Callbacks run on the
    /// completing thread; a callback that panics unwinds through this call and the callbacks
    /// registered after it never run, so callbacks must not panic.
    pub(crate) fn complete(
        this: &Arc<Self>,
        result: Option<ErasedResult>,
        error: i32,
        error_message: String,
    ) {
        let (callbacks, wakers) = {
            let mut state = this.lock();
            if state.status != AsyncStatus::Pending {
                drop(state);
                assert::fail("async result completed more than once");
            }
            if let Some(value) = result {
                if this.result.set(value).is_err() {
                    drop(state);
                    assert::fail("async result value stored more than once");
                }
            }
            state.error = error;
            state.error_message = error_message;
            state.status = AsyncStatus::Complete;
            (
                std::mem::take(&mut state.callbacks),
                std::mem::take(&mut state.wakers),
            )
        };
        this.settled_cv.notify_all();

        log::trace!(
            "async result completed with error {error}; dispatching {} callback(s) and {} waker(s)",
            callbacks.len(),
            wakers.len()
        );

        for (_, waker) in wakers {
            waker.wake();
        }
        if callbacks.is_empty() {
            return;
        }
        let view = AsyncResultBase::from_block(Arc::clone(this));
        for callback in callbacks {
            callback(&view);
        }
    }

    /// Record that the completer went away without completing and release every waiter.
    pub(crate) fn abandon(&self) {
        let wakers = {
            let mut state = self.lock();
            if state.status != AsyncStatus::Pending {
                return;
            }
            state.abandoned = true;
            std::mem::take(&mut state.wakers)
        };
        self.settled_cv.notify_all();
        for (_, waker) in wakers {
            waker.wake();
        }
    }

    /// Register a callback, or run it right away if the block is already complete.
    pub(crate) fn on_completion(this: &Arc<Self>, callback: CompletionCallback) {
        {
            let mut state = this.lock();
            if state.status == AsyncStatus::Pending {
                state.callbacks.push(callback);
                return;
            }
        }
        callback(&AsyncResultBase::from_block(Arc::clone(this)));
    }

    /// Park the calling thread until the block settles or `timeout` elapses.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Settled {
        let state = self.lock();
        let (state, _) = self
            .settled_cv
            .wait_timeout_while(state, timeout, |state| state.settled().is_none())
            .unwrap_or_else(PoisonError::into_inner);
        state.settled().unwrap_or(Settled::TimedOut)
    }

    /// Poll for settlement, keeping exactly one waker registered under `key` while pending.
    pub(crate) fn poll_settled(&self, key: &mut Option<u64>, cx: &mut Context<'_>) -> Poll<Settled> {
        let mut state = self.lock();
        if let Some(settled) = state.settled() {
            if let Some(registered) = key.take() {
                state.forget_waker(registered);
            }
            return Poll::Ready(settled);
        }

        let waker = cx.waker();
        match *key {
            Some(registered) => {
                let position = state
                    .wakers
                    .iter()
                    .position(|(candidate, _)| *candidate == registered);
                match position {
                    Some(index) => {
                        let slot = &mut state.wakers[index].1;
                        if !slot.will_wake(waker) {
                            *slot = waker.clone();
                        }
                    }
                    None => state.wakers.push((registered, waker.clone())),
                }
            }
            None => {
                let registered = state.next_waker_key;
                state.next_waker_key += 1;
                state.wakers.push((registered, waker.clone()));
                *key = Some(registered);
            }
        }
        Poll::Pending
    }

    pub(crate) fn forget_waker(&self, key: u64) {
        self.lock().forget_waker(key);
    }

    /// Callbacks plus wakers still parked on the block.
    #[cfg(test)]
    pub(crate) fn pending_listeners(&self) -> usize {
        let state = self.lock();
        state.callbacks.len() + state.wakers.len()
    }
}

impl Drop for ControlBlock {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.status == AsyncStatus::Pending && !state.callbacks.is_empty() {
            log::trace!(
                "async result dropped while pending; {} callback(s) will never run",
                state.callbacks.len()
            );
        }
    }
}
