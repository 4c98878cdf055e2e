// Example: driving the scroll-activity tracker from a simulated event loop.
use std::time::Duration;

use virtual_scroll::{ManualScheduler, ScrollActivity};

fn main() {
    let scheduler = ManualScheduler::new();
    let mut activity = ScrollActivity::new(scheduler.clone(), Duration::from_millis(100));
    activity.set_on_settled(Some(|| println!("  settled")));

    // Wheel events every 30ms for a while, then silence.
    for t in (0..=150).step_by(30) {
        scheduler.advance_to(Duration::from_millis(t));
        activity.notify_position_change();
        println!("t={t}ms scroll event, is_scrolling={}", activity.is_scrolling());
    }

    for t in [200u64, 249, 250, 300] {
        scheduler.advance_to(Duration::from_millis(t));
        println!("t={t}ms is_scrolling={}", activity.is_scrolling());
    }
}
