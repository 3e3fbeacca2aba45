//! Progress bar over dispatched units for verbose parallel runs.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::engine::parallel::DispatchEvent;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a bar with an unknown total; [`set_bar_total`] fills it in once units are planned.
pub fn create_progress_bar(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        unit = " dirs"
    )))
}

/// Update the bar's total. Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Advance the bar by `n`.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update(n);
    }
}

/// Drive `pb` from dispatcher events.
pub fn on_dispatch_event(pb: &ProgressBar, event: DispatchEvent<'_>) {
    match event {
        DispatchEvent::Planned { units } => set_bar_total(pb, units),
        DispatchEvent::UnitDone { .. } => update_progress_bar(pb, 1),
    }
}

/// Finish the line so following output starts on a fresh one.
pub fn close_progress_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.refresh();
        eprintln!();
    }
}
