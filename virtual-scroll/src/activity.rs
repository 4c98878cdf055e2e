use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

use crate::Scheduler;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPhase {
    #[default]
    Settled,
    Scrolling,
}

/// Invoked once per `Scrolling -> Settled` transition, from the scheduler's task.
pub type OnSettledCallback = Rc<dyn Fn()>;

struct Shared<H> {
    phase: ScrollPhase,
    pending: Option<H>,
    on_settled: Option<OnSettledCallback>,
}

/// Debounced "is scrolling" tracker.
///
/// Every position change flips the phase to [`ScrollPhase::Scrolling`] immediately and re-arms a
/// single settle timer of `delay`. The phase returns to [`ScrollPhase::Settled`] only after
/// `delay` passes with no further change.
///
/// The tracker owns at most one live timer handle. Shutting down (or dropping) the tracker
/// cancels it through the [`Scheduler`], so a settle can never fire afterwards.
pub struct ScrollActivity<S: Scheduler> {
    scheduler: S,
    delay: Duration,
    shared: Rc<RefCell<Shared<S::Handle>>>,
}

impl<S: Scheduler> ScrollActivity<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            shared: Rc::new(RefCell::new(Shared {
                phase: ScrollPhase::Settled,
                pending: None,
                on_settled: None,
            })),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Takes effect the next time the timer is armed.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn set_on_settled(&mut self, on_settled: Option<impl Fn() + 'static>) {
        self.shared.borrow_mut().on_settled = on_settled.map(|f| Rc::new(f) as _);
    }

    pub fn phase(&self) -> ScrollPhase {
        self.shared.borrow().phase
    }

    pub fn is_scrolling(&self) -> bool {
        self.phase() == ScrollPhase::Scrolling
    }

    pub fn has_pending_timer(&self) -> bool {
        self.shared.borrow().pending.is_some()
    }

    /// Records a position change: enters `Scrolling` and restarts the settle timer.
    pub fn notify_position_change(&mut self) {
        let prev = {
            let mut shared = self.shared.borrow_mut();
            if shared.phase == ScrollPhase::Settled {
                vtrace!("scroll started");
            }
            shared.phase = ScrollPhase::Scrolling;
            shared.pending.take()
        };
        if let Some(handle) = prev {
            self.scheduler.cancel(handle);
        }

        let shared = Rc::clone(&self.shared);
        let handle = self
            .scheduler
            .schedule(self.delay, Box::new(move || settle(&shared)));
        self.shared.borrow_mut().pending = Some(handle);
    }

    /// Cancels the pending settle timer and returns to `Settled` without invoking the
    /// `on_settled` hook.
    ///
    /// Idempotent. Called automatically on drop.
    pub fn shutdown(&mut self) {
        let pending = {
            let mut shared = self.shared.borrow_mut();
            shared.phase = ScrollPhase::Settled;
            shared.pending.take()
        };
        if let Some(handle) = pending {
            vdebug!("cancelling pending settle timer");
            self.scheduler.cancel(handle);
        }
    }
}

fn settle<H>(shared: &RefCell<Shared<H>>) {
    let hook = {
        let mut shared = shared.borrow_mut();
        debug_assert!(
            shared.phase == ScrollPhase::Scrolling,
            "settle timer fired while already settled"
        );
        shared.pending = None;
        shared.phase = ScrollPhase::Settled;
        shared.on_settled.clone()
    };
    vtrace!("scroll settled");
    if let Some(hook) = hook {
        hook();
    }
}

impl<S: Scheduler> Drop for ScrollActivity<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: Scheduler> fmt::Debug for ScrollActivity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollActivity")
            .field("delay", &self.delay)
            .field("phase", &self.phase())
            .field("has_pending_timer", &self.has_pending_timer())
            .finish_non_exhaustive()
    }
}
