use crate::*;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::time::Duration;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn indexes(w: Window) -> Vec<usize> {
    w.iter().map(|it| it.index).collect()
}

fn list(count: usize) -> ViewportConfig {
    ViewportConfig::new(500, 50, count).unwrap()
}

#[test]
fn window_at_top_is_clamped_to_zero() {
    let w = list(100).window(0);
    // visible_end = ceil(500 / 50) = 10, plus overscan 3.
    assert_eq!(w.first_index(), Some(0));
    assert_eq!(w.last_index(), Some(13));
    assert_eq!(w.len(), 14);
}

#[test]
fn window_mid_list_adds_overscan_on_both_sides() {
    let c = list(100);
    let visible = c.visible_range(1000);
    assert_eq!(visible.start_index, 20);
    assert_eq!(visible.end_index, 30);

    let w = c.window(1000);
    assert_eq!(indexes(w), (17..=33).collect::<Vec<_>>());
}

#[test]
fn window_end_clamps_to_last_item() {
    let w = list(20).window(1000);
    assert_eq!(w.first_index(), Some(17));
    assert_eq!(w.last_index(), Some(19));
}

#[test]
fn window_past_end_of_list_is_empty() {
    // e.g. the list shrank while the viewport stayed scrolled down.
    let w = list(10).window(1000);
    assert!(w.is_empty());
    assert_eq!(w.len(), 0);
    assert_eq!(w.iter().count(), 0);
    assert_eq!(w.last_index(), None);
}

#[test]
fn empty_list_yields_empty_window() {
    for scroll_top in [0u64, 1, 499, 10_000, u64::MAX] {
        assert!(list(0).window(scroll_top).is_empty());
    }
}

#[test]
fn zero_container_height_yields_empty_window() {
    let c = list(100).with_container_height(0);
    assert!(c.window(0).is_empty());
    assert!(c.visible_range(0).is_empty());
}

#[test]
fn compute_window_matches_config_window() {
    let c = list(100).with_overscan(5);
    for scroll_top in [0u64, 1, 49, 50, 51, 1234, 4500, 9999] {
        let w = compute_window(scroll_top, 500, 50, 100, 5).unwrap();
        assert_eq!(w, c.window(scroll_top));
    }
}

#[test]
fn zero_item_height_is_rejected() {
    assert_eq!(
        compute_window(0, 500, 0, 100, 3),
        Err(ConfigError::ZeroItemHeight)
    );
    assert_eq!(
        ViewportConfig::new(500, 0, 100),
        Err(ConfigError::ZeroItemHeight)
    );
    assert_eq!(
        list(100).with_item_height(0),
        Err(ConfigError::ZeroItemHeight)
    );
}

#[test]
fn overflowing_extent_is_rejected() {
    let err = ViewportConfig::new(500, u32::MAX, usize::MAX).unwrap_err();
    assert_eq!(
        err,
        ConfigError::ExtentOverflow {
            item_count: usize::MAX,
            item_height: u32::MAX,
        }
    );
    assert!(list(0).with_item_count(1_000_000_000).is_ok());
}

#[test]
fn extreme_offsets_do_not_panic() {
    // Default overscan: the offset is far past the end of the list.
    let c = ViewportConfig::new(u32::MAX, 1, 1_000).unwrap();
    assert!(c.window(u64::MAX).is_empty());

    // An overscan as large as the offset reaches back to the first row.
    let c = c.with_overscan(usize::MAX);
    let w = c.window(u64::MAX);
    assert_eq!(w.first_index(), Some(0));
    assert_eq!(w.last_index(), Some(999));
    assert_eq!(w.iter().next_back().map(|it| it.offset_top), Some(999));

    let w = c.window(0);
    assert_eq!(w.first_index(), Some(0));
    assert_eq!(w.last_index(), Some(999));
}

#[test]
fn offset_top_is_exact() {
    let c = ViewportConfig::new(700, 37, 10_000).unwrap();
    for scroll_top in [0u64, 37, 1_000, 123_456, 369_000] {
        for item in c.window(scroll_top) {
            assert_eq!(item.offset_top, item.index as u64 * 37);
            assert_eq!(c.item_offset(item.index), Some(item.offset_top));
        }
    }
}

#[test]
fn randomized_windows_are_contiguous_and_in_bounds() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..2_000 {
        let item_height = rng.gen_range_u32(1, 200);
        let item_count = rng.gen_range_usize(0, 5_000);
        let container_height = rng.gen_range_u32(1, 2_000);
        let overscan = rng.gen_range_usize(0, 20);
        let total = item_count as u64 * item_height as u64;
        let scroll_top = rng.gen_range_u64(0, total + 5_000);

        let w = compute_window(
            scroll_top,
            container_height,
            item_height,
            item_count,
            overscan,
        )
        .unwrap();

        let items = w.to_vec();
        assert_eq!(items.len(), w.len());
        for pair in items.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
        for item in &items {
            assert!(item.index < item_count);
            assert_eq!(item.offset_top, item.index as u64 * item_height as u64);
        }

        // Pure: same inputs, same output.
        let again = compute_window(
            scroll_top,
            container_height,
            item_height,
            item_count,
            overscan,
        )
        .unwrap();
        assert_eq!(again.to_vec(), items);

        // The strictly visible rows are always covered while the list reaches the viewport.
        let c = ViewportConfig::new(container_height, item_height, item_count)
            .unwrap()
            .with_overscan(overscan);
        let visible = c.visible_range(scroll_top);
        for i in visible.start_index..visible.end_index {
            assert!(w.contains(i), "visible row {i} missing from {w:?}");
        }
    }
}

#[test]
fn window_bounds_are_monotonic_in_scroll_top() {
    let mut rng = Lcg::new(42);
    for _ in 0..200 {
        let item_height = rng.gen_range_u32(1, 80);
        let item_count = rng.gen_range_usize(1, 500);
        let c = ViewportConfig::new(rng.gen_range_u32(1, 800), item_height, item_count)
            .unwrap()
            .with_overscan(rng.gen_range_usize(0, 8));

        let mut prev: Option<Window> = None;
        let mut past_end = false;
        let mut scroll_top = 0u64;
        let limit = c.total_height() + 1_000;
        while scroll_top < limit {
            let w = c.window(scroll_top);
            if w.is_empty() {
                past_end = true;
            } else {
                // Once past the end, further scrolling never brings rows back.
                assert!(!past_end, "rows reappeared at scroll_top={scroll_top}");
                if let Some(p) = prev {
                    assert!(w.start_index() >= p.start_index());
                    assert!(w.end_index() >= p.end_index());
                }
                prev = Some(w);
            }
            scroll_top += rng.gen_range_u64(1, 3 * item_height as u64);
        }
    }
}

#[test]
fn collect_items_clears_buffer_first() {
    let w = list(100).window(1000);
    let mut out = vec![VirtualItem {
        index: 999,
        offset_top: 0,
    }];
    w.collect_items(&mut out);
    assert_eq!(out.len(), w.len());
    assert_eq!(out[0].index, 17);
    assert_eq!(out[0].offset_top, 850);
}

#[test]
fn window_iter_is_double_ended_and_exact() {
    let w = list(100).window(1000);
    let mut it = w.iter();
    assert_eq!(it.len(), 17);
    assert_eq!(it.next_back().map(|i| i.index), Some(33));
    assert_eq!(it.next().map(|i| i.index), Some(17));
    assert_eq!(it.len(), 15);

    let rev: Vec<usize> = w.iter().rev().map(|i| i.index).collect();
    assert_eq!(rev.first(), Some(&33));
    assert_eq!(rev.last(), Some(&17));

    let mut seen = 0;
    w.for_each_item(|_| seen += 1);
    assert_eq!(seen, 17);
}

#[test]
fn geometry_queries() {
    let c = list(100);
    assert_eq!(c.total_height(), 5_000);
    assert_eq!(c.max_scroll_top(), 4_500);
    assert_eq!(c.clamp_scroll_top(9_000), 4_500);
    assert_eq!(c.clamp_scroll_top(10), 10);

    assert_eq!(c.index_at_offset(0), Some(0));
    assert_eq!(c.index_at_offset(49), Some(0));
    assert_eq!(c.index_at_offset(50), Some(1));
    assert_eq!(c.index_at_offset(4_999), Some(99));
    assert_eq!(c.index_at_offset(5_000), None);

    assert_eq!(c.item_offset(99), Some(4_950));
    assert_eq!(c.item_offset(100), None);

    let v = c.visible_range(1010);
    assert_eq!((v.start_index, v.end_index), (20, 31));
    assert_eq!(v.len(), 11);

    // Short list: nothing to scroll.
    assert_eq!(list(3).max_scroll_top(), 0);
}

#[test]
fn scroll_to_index_alignment() {
    let c = list(100);
    assert_eq!(c.scroll_to_index_offset(20, Align::Start, 0), 1_000);
    assert_eq!(c.scroll_to_index_offset(20, Align::End, 0), 550);
    assert_eq!(c.scroll_to_index_offset(20, Align::Center, 0), 775);

    // Auto keeps fully visible rows in place and otherwise moves the minimum distance.
    assert_eq!(c.scroll_to_index_offset(5, Align::Auto, 0), 0);
    assert_eq!(c.scroll_to_index_offset(20, Align::Auto, 0), 550);
    assert_eq!(c.scroll_to_index_offset(2, Align::Auto, 1_000), 100);

    // Clamped to the scrollable extent, and out-of-range indexes clamp to the last row.
    assert_eq!(c.scroll_to_index_offset(99, Align::Start, 0), 4_500);
    assert_eq!(c.scroll_to_index_offset(5_000, Align::Start, 0), 4_500);
    assert_eq!(list(0).scroll_to_index_offset(3, Align::Start, 0), 0);
}

#[test]
fn config_defaults_and_raw_round_trip() {
    let c = list(100);
    assert_eq!(c.overscan(), DEFAULT_OVERSCAN);
    assert_eq!(c.scrolling_delay(), ms(100));

    let c = c.with_overscan(7).with_scrolling_delay(ms(250));
    let raw = RawViewportConfig::from(c);
    assert_eq!(raw.scrolling_delay_us, 250_000);
    assert_eq!(ViewportConfig::try_from(raw), Ok(c));

    let fine = c.with_scrolling_delay(Duration::from_micros(1_500));
    let raw_fine = RawViewportConfig::from(fine);
    assert_eq!(raw_fine.scrolling_delay_us, 1_500);
    assert_eq!(
        ViewportConfig::try_from(raw_fine).map(|c| c.scrolling_delay()),
        Ok(Duration::from_micros(1_500))
    );

    let bad = RawViewportConfig {
        item_height: 0,
        ..raw
    };
    assert_eq!(
        ViewportConfig::try_from(bad),
        Err(ConfigError::ZeroItemHeight)
    );
}

#[test]
fn window_from_range_upholds_invariants() {
    assert_eq!(Window::from_range(17, 34, 50), Ok(list(100).window(1000)));
    assert_eq!(
        Window::from_range(5, 3, 50),
        Err(ConfigError::InvertedRange {
            start_index: 5,
            end_index: 3,
        })
    );
    assert_eq!(
        Window::from_range(5, 3_000_000_000_000_000_000, 4_000_000_000),
        Err(ConfigError::ExtentOverflow {
            item_count: 3_000_000_000_000_000_000,
            item_height: 4_000_000_000,
        })
    );
    assert_eq!(
        Window::from_range(0, 4, 0),
        Err(ConfigError::ZeroItemHeight)
    );

    let empty = Window::from_range(7, 7, 0).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.iter().next_back(), None);
}

#[cfg(feature = "serde")]
#[test]
fn deserialized_window_is_validated() {
    let err = serde_json::from_str::<Window>(
        r#"{"start_index":5,"end_index":3000000000000000000,"item_height":4000000000}"#,
    );
    assert!(err.is_err());

    let err = serde_json::from_str::<Window>(r#"{"start_index":9,"end_index":2,"item_height":10}"#);
    assert!(err.is_err());

    let w = list(100).window(1000);
    let json = serde_json::to_string(&w).unwrap();
    let back: Window = serde_json::from_str(&json).unwrap();
    assert_eq!(back, w);
    assert_eq!(back.iter().next_back().map(|it| it.offset_top), Some(33 * 50));
}

#[cfg(feature = "serde")]
#[test]
fn serialized_config_keeps_sub_millisecond_delay() {
    let c = list(100).with_scrolling_delay(Duration::from_micros(1_500));
    let json = serde_json::to_string(&c).unwrap();
    let back: ViewportConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);

    let defaults: ViewportConfig =
        serde_json::from_str(r#"{"container_height":500,"item_height":50,"item_count":100}"#)
            .unwrap();
    assert_eq!(defaults, list(100));

    let bad = serde_json::from_str::<ViewportConfig>(
        r#"{"container_height":500,"item_height":0,"item_count":100}"#,
    );
    assert!(bad.is_err());
}

#[test]
fn config_error_messages() {
    use alloc::string::ToString;

    assert_eq!(
        ConfigError::ZeroItemHeight.to_string(),
        "item height must be greater than zero"
    );
}

fn counting_activity(
    sched: &ManualScheduler,
    delay: Duration,
) -> (ScrollActivity<ManualScheduler>, Rc<Cell<usize>>) {
    let settled = Rc::new(Cell::new(0usize));
    let mut a = ScrollActivity::new(sched.clone(), delay);
    a.set_on_settled(Some({
        let settled = Rc::clone(&settled);
        move || settled.set(settled.get() + 1)
    }));
    (a, settled)
}

#[test]
fn activity_starts_settled() {
    let sched = ManualScheduler::new();
    let a = ScrollActivity::new(sched.clone(), ms(100));
    assert_eq!(a.phase(), ScrollPhase::Settled);
    assert!(!a.is_scrolling());
    assert!(!a.has_pending_timer());
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn single_change_settles_exactly_after_delay() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    sched.advance_to(ms(10));
    a.notify_position_change();
    assert!(a.is_scrolling());
    assert_eq!(sched.next_deadline(), Some(ms(110)));

    sched.advance_to(ms(109));
    assert!(a.is_scrolling());
    assert_eq!(settled.get(), 0);

    sched.advance_to(ms(110));
    assert!(!a.is_scrolling());
    assert!(!a.has_pending_timer());
    assert_eq!(settled.get(), 1);

    sched.advance_to(ms(1_000));
    assert_eq!(settled.get(), 1);
}

#[test]
fn repeated_changes_debounce_the_settle_deadline() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    a.notify_position_change();
    sched.advance_to(ms(50));
    a.notify_position_change();

    // The first deadline (t=100) must not flip the flag.
    sched.advance_to(ms(100));
    assert!(a.is_scrolling());
    sched.advance_to(ms(149));
    assert!(a.is_scrolling());
    assert_eq!(settled.get(), 0);

    sched.advance_to(ms(150));
    assert!(!a.is_scrolling());
    assert_eq!(settled.get(), 1);
}

#[test]
fn rearming_keeps_a_single_live_timer() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    for t in 0..1_000u64 {
        sched.advance_to(ms(t));
        a.notify_position_change();
        assert_eq!(sched.pending_count(), 1);
    }
    sched.advance_by(ms(100));
    assert_eq!(settled.get(), 1);
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn shutdown_cancels_pending_timer() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    a.notify_position_change();
    a.shutdown();
    assert_eq!(sched.pending_count(), 0);
    assert!(!a.is_scrolling());

    sched.advance_to(ms(500));
    assert_eq!(settled.get(), 0);

    a.shutdown();
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn dropping_activity_cancels_pending_timer() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    a.notify_position_change();
    assert_eq!(sched.pending_count(), 1);
    drop(a);
    assert_eq!(sched.pending_count(), 0);

    sched.advance_to(ms(500));
    assert_eq!(settled.get(), 0);
}

#[test]
fn delay_change_applies_on_next_arm() {
    let sched = ManualScheduler::new();
    let (mut a, settled) = counting_activity(&sched, ms(100));

    a.notify_position_change();
    a.set_delay(ms(20));
    assert_eq!(sched.next_deadline(), Some(ms(100)));

    a.notify_position_change();
    assert_eq!(sched.next_deadline(), Some(ms(20)));
    sched.advance_to(ms(20));
    assert_eq!(settled.get(), 1);
}

#[test]
fn zero_delay_settles_on_next_advance() {
    let sched = ManualScheduler::new();
    let mut a = ScrollActivity::new(sched.clone(), Duration::ZERO);

    a.notify_position_change();
    assert!(a.is_scrolling());
    sched.advance_by(Duration::ZERO);
    assert!(!a.is_scrolling());
}

#[test]
fn manual_scheduler_runs_in_deadline_order() {
    let sched = ManualScheduler::new();
    let log = Rc::new(core::cell::RefCell::new(Vec::new()));

    for (delay, tag) in [(30u64, 'c'), (10, 'a'), (20, 'b'), (10, 'A')] {
        let log = Rc::clone(&log);
        sched.schedule(ms(delay), Box::new(move || log.borrow_mut().push(tag)));
    }

    assert_eq!(sched.advance_to(ms(20)), 3);
    assert_eq!(*log.borrow(), vec!['a', 'A', 'b']);
    assert_eq!(sched.now(), ms(20));
    assert_eq!(sched.pending_count(), 1);
}

#[test]
fn manual_scheduler_cancel_is_idempotent() {
    let sched = ManualScheduler::new();
    let ran = Rc::new(Cell::new(false));

    let id = {
        let ran = Rc::clone(&ran);
        sched.schedule(ms(5), Box::new(move || ran.set(true)))
    };
    sched.cancel(id);
    sched.cancel(id);
    sched.advance_to(ms(10));
    assert!(!ran.get());

    // Cancelling after the task ran is a no-op.
    let id = {
        let ran = Rc::clone(&ran);
        sched.schedule(ms(5), Box::new(move || ran.set(true)))
    };
    sched.advance_by(ms(5));
    assert!(ran.get());
    sched.cancel(id);
}

#[test]
fn manual_scheduler_tasks_can_schedule_more_work() {
    let sched = ManualScheduler::new();
    let hits = Rc::new(Cell::new(0u32));

    {
        let inner = sched.clone();
        let hits = Rc::clone(&hits);
        sched.schedule(
            ms(10),
            Box::new(move || {
                hits.set(hits.get() + 1);
                let hits = Rc::clone(&hits);
                inner.schedule(ms(5), Box::new(move || hits.set(hits.get() + 10)));
            }),
        );
    }

    assert_eq!(sched.advance_to(ms(15)), 2);
    assert_eq!(hits.get(), 11);
}

#[test]
fn manual_scheduler_ignores_backwards_clock() {
    let sched = ManualScheduler::new();
    sched.advance_to(ms(100));
    assert_eq!(sched.advance_to(ms(50)), 0);
    assert_eq!(sched.now(), ms(100));
}
