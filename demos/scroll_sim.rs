// Example: drive the engine from a simulated scroll container.
use std::cell::RefCell;
use std::rc::Rc;

use virtual_rows::{ScrollViewport, ViewportSignal, WindowEngine, WindowOptions};

fn main() {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let opts = WindowOptions::new(1000, 30.0)
        .with_overscan(4)
        .with_debounce_ms(Some(50))
        .with_on_change_range(Some({
            let changes = Rc::clone(&changes);
            move |_: &[usize], from: usize, to: usize| changes.borrow_mut().push((from, to))
        }));

    let viewport = Rc::new(ScrollViewport::new(300.0));
    let handle: Rc<dyn ViewportSignal> = viewport.clone();

    let mut engine = WindowEngine::new(opts.clone());
    let state = engine.attach(opts, Some(handle), 0);
    println!(
        "attached: render_count={}, range={}..{}, bottom_spacer={}",
        state.render_count,
        state.index_from(),
        state.index_to(),
        state.bottom_spacer_height
    );

    // A burst of scroll events collapses into one notification.
    for (i, top) in [600.0, 1200.0, 1800.0, 2400.0, 3000.0].into_iter().enumerate() {
        viewport.scroll_to(top, 10 + i as u64);
    }
    engine.tick(100);

    let state = engine.state();
    println!(
        "scrolled: range={}..{}, top_spacer={}",
        state.index_from(),
        state.index_to(),
        state.top_spacer_height
    );
    println!("notifications={:?}", changes.borrow());
}
