// Example: a host that owns its scroll state (e.g. a TUI) driving a binding.
use std::time::Duration;

use virtual_scroll::{ManualScheduler, ViewportConfig};
use virtual_scroll_adapter::{ManualViewport, ScrollBinding, ScrollFrame};

fn main() {
    let scheduler = ManualScheduler::new();
    let viewport = ManualViewport::new(20);
    let config = ViewportConfig::new(20, 1, 10_000)
        .expect("valid config")
        .with_overscan(2)
        .with_scrolling_delay(Duration::from_millis(120));

    let mut binding = ScrollBinding::new(scheduler.clone(), config);
    binding.set_on_change(Some(|frame: &ScrollFrame| {
        println!(
            "paint scroll_top={} rows={:?}..={:?} scrolling={}",
            frame.scroll_top,
            frame.window.first_index(),
            frame.window.last_index(),
            frame.is_scrolling
        );
    }));
    binding.attach(Some(viewport.clone()));

    // Key repeat: one row every 16ms.
    for step in 1..=5u64 {
        scheduler.advance_to(Duration::from_millis(step * 16));
        viewport.scroll_by(1);
    }

    // Idle long enough for the debounce to settle.
    scheduler.advance_by(Duration::from_millis(200));

    // Terminal resize.
    viewport.set_height(40);
    binding.sync_container_height();

    binding.detach();
    viewport.scroll_to(500);
    println!("after detach: listeners={}", viewport.listener_count());
}
