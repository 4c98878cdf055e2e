use virtual_scroll::{Align, ViewportConfig, compute_window};

fn main() {
    let config = ViewportConfig::new(500, 50, 100).expect("valid config");

    for scroll_top in [0u64, 1_000, 4_500] {
        let window = config.window(scroll_top);
        println!(
            "scroll_top={scroll_top} rows={:?}..={:?} len={}",
            window.first_index(),
            window.last_index(),
            window.len()
        );
    }

    // Reuse a scratch buffer across frames.
    let mut items = Vec::new();
    config.window(1_000).collect_items(&mut items);
    println!("first={:?} last={:?}", items.first(), items.last());

    let target = config.scroll_to_index_offset(42, Align::Center, 0);
    println!("scroll_to_index(42, Center) -> {target}");

    match compute_window(0, 500, 0, 100, 3) {
        Ok(w) => println!("unexpected window {w:?}"),
        Err(err) => println!("rejected: {err}"),
    }
}
