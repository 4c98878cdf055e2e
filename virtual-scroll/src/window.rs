use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::config::to_index;
use crate::error::validate_extent;
use crate::{ConfigError, VirtualItem};

/// A contiguous run of rows to render.
///
/// This is a cheap `Copy` value: items are produced on demand by [`Window::iter`], ascending by
/// index, without duplicates, and always inside `[0, item_count)`.
///
/// With `feature = "serde"`, deserialization goes through [`Window::from_range`], so a decoded
/// window upholds the same invariants as a computed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Window {
    start_index: usize,
    end_index: usize, // exclusive
    item_height: u32,
}

impl Window {
    pub fn empty(item_height: u32) -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            item_height,
        }
    }

    /// Builds a window over `[start_index, end_index)`.
    ///
    /// Rejects an inverted range, and a non-empty range whose offsets would not fit in `u64`
    /// (or whose item height is zero).
    pub fn from_range(
        start_index: usize,
        end_index: usize,
        item_height: u32,
    ) -> Result<Self, ConfigError> {
        if end_index < start_index {
            return Err(ConfigError::InvertedRange {
                start_index,
                end_index,
            });
        }
        if end_index > start_index {
            validate_extent(item_height, end_index)?;
        }
        Ok(Self {
            start_index,
            end_index,
            item_height,
        })
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Exclusive end index.
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn first_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.start_index)
    }

    /// Inclusive last index.
    pub fn last_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end_index - 1)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index < self.end_index
    }

    pub fn iter(&self) -> WindowIter {
        WindowIter {
            next: self.start_index,
            end: self.end_index.max(self.start_index),
            item_height: self.item_height as u64,
        }
    }

    pub fn for_each_item(&self, f: impl FnMut(VirtualItem)) {
        self.iter().for_each(f);
    }

    /// Collects the window into `out` (clears `out` first).
    ///
    /// Reuse a scratch buffer across frames to avoid reallocating.
    pub fn collect_items(&self, out: &mut Vec<VirtualItem>) {
        out.clear();
        out.extend(self.iter());
    }

    pub fn to_vec(&self) -> Vec<VirtualItem> {
        self.iter().collect()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWindow {
    start_index: usize,
    end_index: usize,
    item_height: u32,
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Window {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawWindow::deserialize(deserializer)?;
        Window::from_range(raw.start_index, raw.end_index, raw.item_height)
            .map_err(serde::de::Error::custom)
    }
}

impl IntoIterator for Window {
    type Item = VirtualItem;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

impl IntoIterator for &Window {
    type Item = VirtualItem;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

/// Iterator over the items of a [`Window`].
#[derive(Clone, Debug)]
pub struct WindowIter {
    next: usize,
    end: usize,
    item_height: u64,
}

impl WindowIter {
    fn item(&self, index: usize) -> VirtualItem {
        VirtualItem {
            index,
            offset_top: index as u64 * self.item_height,
        }
    }
}

impl Iterator for WindowIter {
    type Item = VirtualItem;

    fn next(&mut self) -> Option<VirtualItem> {
        if self.next >= self.end {
            return None;
        }
        let item = self.item(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for WindowIter {
    fn next_back(&mut self) -> Option<VirtualItem> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.item(self.end))
    }
}

impl ExactSizeIterator for WindowIter {}

impl FusedIterator for WindowIter {}

/// Computes the rows to render for a fixed-height list.
///
/// The visible rows are `floor(scroll_top / item_height)` through
/// `ceil((scroll_top + container_height) / item_height)`, extended by `overscan` on both sides and
/// clamped to `[0, item_count - 1]`. An empty list, a zero-height container, or an offset past
/// the end of the list yield an empty window.
///
/// Returns an error instead of dividing by a zero `item_height`.
pub fn compute_window(
    scroll_top: u64,
    container_height: u32,
    item_height: u32,
    item_count: usize,
    overscan: usize,
) -> Result<Window, ConfigError> {
    validate_extent(item_height, item_count)?;
    Ok(window_for(
        scroll_top,
        container_height,
        item_height,
        item_count,
        overscan,
    ))
}

pub(crate) fn window_for(
    scroll_top: u64,
    container_height: u32,
    item_height: u32,
    item_count: usize,
    overscan: usize,
) -> Window {
    debug_assert!(item_height > 0, "item_height must be validated");
    if item_count == 0 || container_height == 0 {
        return Window::empty(item_height);
    }

    let h = item_height as u64;
    let visible_start = scroll_top / h;
    let visible_end = scroll_top.saturating_add(container_height as u64).div_ceil(h);

    let start = to_index(visible_start).saturating_sub(overscan);
    let last = to_index(visible_end).saturating_add(overscan).min(item_count - 1);

    if last < start {
        vtrace!(scroll_top, item_count, "window past end of list");
        return Window::empty(item_height);
    }

    vtrace!(scroll_top, start, last, "window");
    Window {
        start_index: start,
        end_index: last + 1,
        item_height,
    }
}
