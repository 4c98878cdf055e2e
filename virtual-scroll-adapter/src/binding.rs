use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use virtual_scroll::{
    ConfigError, ScrollActivity, Scheduler, ViewportConfig, VirtualItem, Window, WindowIter,
};

use crate::Viewport;

/// A callback fired with the freshly computed frame.
pub type OnChangeCallback = Rc<dyn Fn(&ScrollFrame)>;

/// What the rendering layer needs for one paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollFrame {
    pub scroll_top: u64,
    pub window: Window,
    pub is_scrolling: bool,
}

impl ScrollFrame {
    pub fn items(&self) -> WindowIter {
        self.window.iter()
    }
}

struct State {
    config: ViewportConfig,
    scroll_top: u64,
    attached: bool,
    on_change: Option<OnChangeCallback>,
}

impl State {
    fn window(&self) -> Window {
        if !self.attached {
            return Window::empty(self.config.item_height());
        }
        self.config.window(self.scroll_top)
    }

    fn frame(&self, is_scrolling: bool) -> ScrollFrame {
        ScrollFrame {
            scroll_top: self.scroll_top,
            window: self.window(),
            is_scrolling,
        }
    }
}

fn emit(state: &RefCell<State>, is_scrolling: bool) {
    let (on_change, frame) = {
        let s = state.borrow();
        let Some(on_change) = s.on_change.clone() else {
            return;
        };
        (on_change, s.frame(is_scrolling))
    };
    on_change(&frame);
}

/// Binds a [`Viewport`] to the window calculator and a [`ScrollActivity`] tracker.
///
/// `attach` samples the current offset once and registers a scroll listener. Every scroll event
/// then, synchronously and in order:
/// - stores the new offset (read by the next window computation)
/// - marks the tracker as scrolling and restarts its settle timer
/// - hands a fresh [`ScrollFrame`] to `on_change`
///
/// `detach` (also run on drop) removes the listener and cancels the settle timer, so nothing
/// observes or fires after teardown. Attaching `None` is a valid no-op: the binding simply has
/// nothing to observe and reports an empty window.
pub struct ScrollBinding<V: Viewport, S: Scheduler> {
    state: Rc<RefCell<State>>,
    activity: Rc<RefCell<ScrollActivity<S>>>,
    viewport: Option<V>,
    listener: Option<V::ListenerId>,
}

impl<V: Viewport, S: Scheduler> ScrollBinding<V, S> {
    /// Creates a detached binding.
    pub fn new(scheduler: S, config: ViewportConfig) -> Self {
        let state = Rc::new(RefCell::new(State {
            config,
            scroll_top: 0,
            attached: false,
            on_change: None,
        }));

        let mut activity = ScrollActivity::new(scheduler, config.scrolling_delay());
        activity.set_on_settled(Some({
            let state = Rc::downgrade(&state);
            move || {
                if let Some(state) = state.upgrade() {
                    emit(&state, false);
                }
            }
        }));

        Self {
            state,
            activity: Rc::new(RefCell::new(activity)),
            viewport: None,
            listener: None,
        }
    }

    /// Removes the scroll listener and cancels any pending settle timer.
    ///
    /// Idempotent; also runs on drop. Returns the viewport that was attached, if any.
    pub fn detach(&mut self) -> Option<V> {
        let viewport = self.viewport.take();
        if let (Some(viewport), Some(id)) = (viewport.as_ref(), self.listener.take()) {
            viewport.remove_scroll_listener(id);
        }
        self.activity.borrow_mut().shutdown();
        if viewport.is_some() {
            vdebug!("detach");
        }
        self.state.borrow_mut().attached = false;
        viewport
    }

    pub fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    pub fn config(&self) -> ViewportConfig {
        self.state.borrow().config
    }

    /// Replaces the configuration and recomputes the frame.
    ///
    /// A new scrolling delay applies from the next scroll event.
    pub fn set_config(&mut self, config: ViewportConfig) {
        self.state.borrow_mut().config = config;
        self.activity.borrow_mut().set_delay(config.scrolling_delay());
        self.notify();
    }

    pub fn set_item_count(&mut self, item_count: usize) -> Result<(), ConfigError> {
        let config = self.config().with_item_count(item_count)?;
        self.set_config(config);
        Ok(())
    }

    /// Reads the attached viewport's rendered height into the configuration.
    pub fn sync_container_height(&mut self) {
        let Some(height) = self.viewport.as_ref().map(|v| v.height()) else {
            return;
        };
        let config = self.config();
        if config.container_height() == height {
            return;
        }
        self.set_config(config.with_container_height(height));
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&ScrollFrame) + 'static>) {
        self.state.borrow_mut().on_change = on_change.map(|f| Rc::new(f) as _);
    }

    pub fn scroll_top(&self) -> u64 {
        self.state.borrow().scroll_top
    }

    pub fn is_scrolling(&self) -> bool {
        self.activity.borrow().is_scrolling()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.activity.borrow().has_pending_timer()
    }

    /// The rows to render; empty while detached.
    pub fn window(&self) -> Window {
        self.state.borrow().window()
    }

    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        self.window().to_vec()
    }

    pub fn frame(&self) -> ScrollFrame {
        let is_scrolling = self.is_scrolling();
        self.state.borrow().frame(is_scrolling)
    }

    fn notify(&self) {
        let is_scrolling = self.is_scrolling();
        emit(&self.state, is_scrolling);
    }
}

impl<V: Viewport, S: Scheduler + 'static> ScrollBinding<V, S> {
    /// Creates a binding and attaches it to `viewport` right away.
    pub fn attached(scheduler: S, config: ViewportConfig, viewport: Option<V>) -> Self {
        let mut binding = Self::new(scheduler, config);
        binding.attach(viewport);
        binding
    }

    /// Attaches to `viewport`, detaching from any previous one first.
    ///
    /// The current offset is sampled immediately so the first frame is correct before any scroll
    /// event arrives. Sampling does not count as scrolling.
    pub fn attach(&mut self, viewport: Option<V>) {
        self.detach();
        let Some(viewport) = viewport else {
            vdebug!("attach: no viewport, nothing to observe");
            return;
        };

        {
            let mut s = self.state.borrow_mut();
            s.scroll_top = viewport.scroll_top();
            s.attached = true;
            vdebug!(scroll_top = s.scroll_top, "attach");
        }

        let listener = {
            let state = Rc::clone(&self.state);
            let activity = Rc::clone(&self.activity);
            Box::new(move |scroll_top: u64| {
                vtrace!(scroll_top, "scroll event");
                state.borrow_mut().scroll_top = scroll_top;
                activity.borrow_mut().notify_position_change();
                emit(&state, true);
            })
        };
        self.listener = Some(viewport.add_scroll_listener(listener));
        self.viewport = Some(viewport);

        self.notify();
    }
}

impl<V: Viewport, S: Scheduler> Drop for ScrollBinding<V, S> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<V: Viewport, S: Scheduler> fmt::Debug for ScrollBinding<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("ScrollBinding")
            .field("attached", &self.viewport.is_some())
            .field("scroll_top", &s.scroll_top)
            .field("config", &s.config)
            .field("activity", &*self.activity.borrow())
            .finish_non_exhaustive()
    }
}
