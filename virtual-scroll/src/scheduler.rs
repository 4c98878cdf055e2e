use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

/// Timer capability used by [`crate::ScrollActivity`].
///
/// Contract:
/// - `cancel` removes the task: a cancelled task is dropped and never runs.
/// - Cancelling a handle whose task already ran is a no-op.
/// - `schedule` must not run `task` synchronously; it runs later, from the host's event loop.
pub trait Scheduler {
    type Handle: 'static;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    type Handle = S::Handle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: Self::Handle) {
        (**self).cancel(handle)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    type Handle = S::Handle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: Self::Handle) {
        (**self).cancel(handle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A single-threaded scheduler on a virtual monotonic clock.
///
/// Time only moves when the host calls [`ManualScheduler::advance_to`] or
/// [`ManualScheduler::advance_by`], which makes debounce behavior fully deterministic. A TUI event
/// loop can drive it from `Instant::elapsed()`.
///
/// Clones share the same clock and task queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<Queue>>,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    tasks: BTreeMap<(Duration, u64), Box<dyn FnOnce()>>,
    deadlines: BTreeMap<u64, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .tasks
            .keys()
            .next()
            .map(|&(deadline, _)| deadline)
    }

    pub fn advance_by(&self, delta: Duration) -> usize {
        let target = self.now().saturating_add(delta);
        self.advance_to(target)
    }

    /// Moves the clock to `now`, running every task due at or before it.
    ///
    /// Tasks run in deadline order (FIFO for equal deadlines), with the clock set to each task's
    /// deadline while it runs. Tasks may schedule or cancel further work. Moving the clock
    /// backwards is ignored.
    ///
    /// Returns the number of tasks that ran.
    pub fn advance_to(&self, now: Duration) -> usize {
        if now < self.now() {
            vwarn!(?now, current = ?self.now(), "ManualScheduler: ignoring backwards clock");
            return 0;
        }
        let mut ran = 0usize;
        loop {
            let task = {
                let mut q = self.inner.borrow_mut();
                let due = match q.tasks.keys().next() {
                    Some(&key) if key.0 <= now => key,
                    _ => break,
                };
                q.deadlines.remove(&due.1);
                q.now = q.now.max(due.0);
                q.tasks.remove(&due)
            };
            if let Some(task) = task {
                task();
                ran += 1;
            }
        }

        let mut q = self.inner.borrow_mut();
        q.now = q.now.max(now);
        ran
    }
}

impl Scheduler for ManualScheduler {
    type Handle = TimerId;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let mut q = self.inner.borrow_mut();
        let id = q.next_id;
        q.next_id += 1;
        let deadline = q.now.saturating_add(delay);
        q.tasks.insert((deadline, id), task);
        q.deadlines.insert(id, deadline);
        TimerId(id)
    }

    fn cancel(&self, handle: TimerId) {
        // Drop the task outside the borrow: its captures may have their own `Drop` logic.
        let removed = {
            let mut q = self.inner.borrow_mut();
            q.deadlines
                .remove(&handle.0)
                .and_then(|deadline| q.tasks.remove(&(deadline, handle.0)))
        };
        drop(removed);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &q.now)
            .field("pending", &q.tasks.len())
            .finish_non_exhaustive()
    }
}
