use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

/// The host's scrollable element, as seen by [`crate::ScrollBinding`].
///
/// Listeners receive the new scroll offset and must be invoked in the order the host observes
/// movement, from the host's single event loop.
pub trait Viewport {
    type ListenerId;

    fn scroll_top(&self) -> u64;

    fn height(&self) -> u32;

    fn add_scroll_listener(&self, listener: Box<dyn FnMut(u64)>) -> Self::ListenerId;

    fn remove_scroll_listener(&self, id: Self::ListenerId);
}

impl<V: Viewport + ?Sized> Viewport for Rc<V> {
    type ListenerId = V::ListenerId;

    fn scroll_top(&self) -> u64 {
        (**self).scroll_top()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn add_scroll_listener(&self, listener: Box<dyn FnMut(u64)>) -> Self::ListenerId {
        (**self).add_scroll_listener(listener)
    }

    fn remove_scroll_listener(&self, id: Self::ListenerId) {
        (**self).remove_scroll_listener(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<RefCell<Box<dyn FnMut(u64)>>>;

/// An in-memory viewport for hosts that own their scroll state (e.g. a TUI), and for tests.
///
/// Clones share the same offset, height and listener list.
#[derive(Clone, Default)]
pub struct ManualViewport {
    inner: Rc<RefCell<Surface>>,
}

#[derive(Default)]
struct Surface {
    scroll_top: u64,
    height: u32,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    dispatching: bool,
    queued: VecDeque<u64>,
}

impl Surface {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.iter().any(|(i, _)| *i == id)
    }
}

/// Clears the dispatch state even if a listener panics.
struct DispatchGuard<'a>(&'a RefCell<Surface>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut s) = self.0.try_borrow_mut() {
            s.dispatching = false;
            s.queued.clear();
        }
    }
}

impl ManualViewport {
    pub fn new(height: u32) -> Self {
        let v = Self::default();
        v.set_height(height);
        v
    }

    pub fn set_height(&self, height: u32) {
        self.inner.borrow_mut().height = height;
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Moves the viewport and notifies listeners in registration order.
    ///
    /// Listeners run with no internal borrow held, so they may read the viewport or scroll it
    /// again. A nested `scroll_to` updates the offset right away; its notification is queued and
    /// delivered after the current one, so listeners always see events in call order. A listener
    /// removed during dispatch is not called again.
    pub fn scroll_to(&self, scroll_top: u64) {
        {
            let mut s = self.inner.borrow_mut();
            s.scroll_top = scroll_top;
            s.queued.push_back(scroll_top);
            if s.dispatching {
                vtrace!(scroll_top, "ManualViewport::scroll_to queued");
                return;
            }
            s.dispatching = true;
        }

        let _guard = DispatchGuard(&self.inner);
        loop {
            let (scroll_top, listeners) = {
                let mut s = self.inner.borrow_mut();
                let Some(scroll_top) = s.queued.pop_front() else {
                    break;
                };
                let listeners: Vec<(u64, Listener)> = s
                    .listeners
                    .iter()
                    .map(|(id, l)| (*id, Rc::clone(l)))
                    .collect();
                (scroll_top, listeners)
            };
            vtrace!(scroll_top, listeners = listeners.len(), "ManualViewport::scroll_to");
            for (id, listener) in listeners {
                if !self.inner.borrow().is_registered(id) {
                    continue;
                }
                let mut f = listener.borrow_mut();
                (&mut *f)(scroll_top);
            }
        }
    }

    pub fn scroll_by(&self, delta: i64) {
        let cur = self.scroll_top();
        let next = if delta >= 0 {
            cur.saturating_add(delta as u64)
        } else {
            cur.saturating_sub(delta.unsigned_abs())
        };
        self.scroll_to(next);
    }
}

impl Viewport for ManualViewport {
    type ListenerId = ListenerId;

    fn scroll_top(&self) -> u64 {
        self.inner.borrow().scroll_top
    }

    fn height(&self) -> u32 {
        self.inner.borrow().height
    }

    fn add_scroll_listener(&self, listener: Box<dyn FnMut(u64)>) -> ListenerId {
        let mut s = self.inner.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        s.listeners.push((id, Rc::new(RefCell::new(listener))));
        ListenerId(id)
    }

    fn remove_scroll_listener(&self, id: ListenerId) {
        let removed = {
            let mut s = self.inner.borrow_mut();
            s.listeners
                .iter()
                .position(|(i, _)| *i == id.0)
                .map(|pos| s.listeners.remove(pos))
        };
        drop(removed);
    }
}

impl fmt::Debug for ManualViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.borrow();
        f.debug_struct("ManualViewport")
            .field("scroll_top", &s.scroll_top)
            .field("height", &s.height)
            .field("listeners", &s.listeners.len())
            .finish()
    }
}
