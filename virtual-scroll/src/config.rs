use core::time::Duration;

use crate::error::validate_extent;
use crate::window::window_for;
use crate::{Align, ConfigError, VisibleRange, Window};

pub const DEFAULT_OVERSCAN: usize = 3;
pub const DEFAULT_SCROLLING_DELAY: Duration = Duration::from_millis(100);

/// A validated viewport configuration.
///
/// Everything the window math needs besides the scroll offset. Construction rejects a zero item
/// height and list extents that would not fit in `u64`, so every query on a `ViewportConfig` is
/// infallible.
///
/// With `feature = "serde"`, this type (de)serializes through [`RawViewportConfig`] and is
/// validated on the way in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawViewportConfig", into = "RawViewportConfig")
)]
pub struct ViewportConfig {
    container_height: u32,
    item_height: u32,
    item_count: usize,
    overscan: usize,
    scrolling_delay: Duration,
}

impl ViewportConfig {
    /// Creates a configuration with the default overscan (3) and scrolling delay (100ms).
    pub fn new(
        container_height: u32,
        item_height: u32,
        item_count: usize,
    ) -> Result<Self, ConfigError> {
        validate_extent(item_height, item_count)?;
        Ok(Self {
            container_height,
            item_height,
            item_count,
            overscan: DEFAULT_OVERSCAN,
            scrolling_delay: DEFAULT_SCROLLING_DELAY,
        })
    }

    pub fn container_height(&self) -> u32 {
        self.container_height
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scrolling_delay(&self) -> Duration {
        self.scrolling_delay
    }

    pub fn with_container_height(mut self, container_height: u32) -> Self {
        self.container_height = container_height;
        self
    }

    pub fn with_item_height(mut self, item_height: u32) -> Result<Self, ConfigError> {
        validate_extent(item_height, self.item_count)?;
        self.item_height = item_height;
        Ok(self)
    }

    pub fn with_item_count(mut self, item_count: usize) -> Result<Self, ConfigError> {
        validate_extent(self.item_height, item_count)?;
        self.item_count = item_count;
        Ok(self)
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_scrolling_delay(mut self, scrolling_delay: Duration) -> Self {
        self.scrolling_delay = scrolling_delay;
        self
    }

    /// Computes the overscanned window for `scroll_top`.
    pub fn window(&self, scroll_top: u64) -> Window {
        window_for(
            scroll_top,
            self.container_height,
            self.item_height,
            self.item_count,
            self.overscan,
        )
    }

    /// Rows intersecting `[scroll_top, scroll_top + container_height)`, without overscan.
    pub fn visible_range(&self, scroll_top: u64) -> VisibleRange {
        if self.item_count == 0 || self.container_height == 0 {
            return VisibleRange::default();
        }
        let h = self.item_height as u64;
        let start = scroll_top / h;
        let end = scroll_top.saturating_add(self.container_height as u64).div_ceil(h);
        VisibleRange {
            start_index: to_index(start).min(self.item_count),
            end_index: to_index(end).min(self.item_count),
        }
    }

    pub fn total_height(&self) -> u64 {
        // Cannot overflow: checked by `validate_extent`.
        self.item_count as u64 * self.item_height as u64
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.total_height().saturating_sub(self.container_height as u64)
    }

    pub fn clamp_scroll_top(&self, scroll_top: u64) -> u64 {
        scroll_top.min(self.max_scroll_top())
    }

    /// Index of the row covering `offset`, or `None` past the end of the list.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let index = to_index(offset / self.item_height as u64);
        (index < self.item_count).then_some(index)
    }

    pub fn item_offset(&self, index: usize) -> Option<u64> {
        (index < self.item_count).then(|| index as u64 * self.item_height as u64)
    }

    /// Computes the scroll offset that brings `index` into view.
    ///
    /// Out-of-range indexes are clamped to the last row. The result is clamped to
    /// [`Self::max_scroll_top`].
    pub fn scroll_to_index_offset(&self, index: usize, align: Align, scroll_top: u64) -> u64 {
        if self.item_count == 0 {
            return 0;
        }
        let index = index.min(self.item_count - 1);
        let h = self.item_height as u64;
        let start = index as u64 * h;
        let end = start.saturating_add(h);
        let view = self.container_height as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(h / 2).saturating_sub(view / 2),
            Align::Auto => {
                let view_end = scroll_top.saturating_add(view);
                if start >= scroll_top && end <= view_end {
                    scroll_top
                } else if start < scroll_top {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_top(target)
    }
}

/// Plain-data form of [`ViewportConfig`], used for (de)serialization.
///
/// Convert with `ViewportConfig::try_from(raw)`. The scrolling delay is stored in microseconds;
/// sub-microsecond precision is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawViewportConfig {
    pub container_height: u32,
    pub item_height: u32,
    pub item_count: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_overscan"))]
    pub overscan: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_scrolling_delay_us"))]
    pub scrolling_delay_us: u64,
}

#[cfg(feature = "serde")]
fn default_overscan() -> usize {
    DEFAULT_OVERSCAN
}

#[cfg(feature = "serde")]
fn default_scrolling_delay_us() -> u64 {
    DEFAULT_SCROLLING_DELAY.as_micros() as u64
}

impl TryFrom<RawViewportConfig> for ViewportConfig {
    type Error = ConfigError;

    fn try_from(raw: RawViewportConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.container_height, raw.item_height, raw.item_count)?
            .with_overscan(raw.overscan)
            .with_scrolling_delay(Duration::from_micros(raw.scrolling_delay_us)))
    }
}

impl From<ViewportConfig> for RawViewportConfig {
    fn from(config: ViewportConfig) -> Self {
        Self {
            container_height: config.container_height,
            item_height: config.item_height,
            item_count: config.item_count,
            overscan: config.overscan,
            scrolling_delay_us: u64::try_from(config.scrolling_delay.as_micros())
                .unwrap_or(u64::MAX),
        }
    }
}

pub(crate) fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
