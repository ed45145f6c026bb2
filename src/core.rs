use std::{
    cell::RefCell,
    collections::VecDeque,
    mem::take,
    rc::{Rc, Weak},
};

use crate::component::ComponentNode;


/// Number of refreshes a single component may go through within one flush before it is considered a runaway loop.
pub const MAX_REFRESH_PASSES: usize = 100;

thread_local! {
    static GLOBALS: RefCell<Globals> = RefCell::new(Globals::new());
}

struct Globals {
    is_flushing: bool,
    batch_depth: usize,
    refreshes: VecDeque<Weak<ComponentNode>>,
}
impl Globals {
    fn new() -> Self {
        Self {
            is_flushing: false,
            batch_depth: 0,
            refreshes: VecDeque::new(),
        }
    }
    fn with<T>(f: impl FnOnce(&mut Self) -> T) -> T {
        GLOBALS.with(|g| f(&mut g.borrow_mut()))
    }
    fn can_flush(&self) -> bool {
        !self.is_flushing && self.batch_depth == 0 && !self.refreshes.is_empty()
    }
}

/// Requests a refresh of `node`.
///
/// A node that is already queued is not queued again.
/// Outside of a flush or batch the queue is drained before this function returns;
/// inside one, the refresh runs after the work in progress.
pub(crate) fn schedule_refresh(node: &Rc<ComponentNode>) {
    let start = Globals::with(|g| {
        if !node.queued.replace(true) {
            g.refreshes.push_back(Rc::downgrade(node));
        }
        // a batch that panicked may have left refreshes behind
        g.can_flush()
    });
    if start {
        flush();
    }
}

/// Runs `f` with refreshes deferred until it returns.
///
/// Nested batches are flushed when the outermost one ends.
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    struct BatchGuard;
    impl Drop for BatchGuard {
        fn drop(&mut self) {
            Globals::with(|g| g.batch_depth -= 1);
        }
    }
    Globals::with(|g| g.batch_depth += 1);
    let ret = {
        let _guard = BatchGuard;
        f()
    };
    if Globals::with(|g| g.can_flush()) {
        flush();
    }
    ret
}

/// Returns `true` while queued refreshes are being processed.
pub fn is_flushing() -> bool {
    Globals::with(|g| g.is_flushing)
}

fn flush() {
    struct FlushGuard {
        touched: Vec<Weak<ComponentNode>>,
    }
    impl Drop for FlushGuard {
        fn drop(&mut self) {
            for node in take(&mut self.touched) {
                if let Some(node) = node.upgrade() {
                    node.passes.set(0);
                }
            }
            let pending = Globals::with(|g| {
                g.is_flushing = false;
                take(&mut g.refreshes)
            });
            // Only non-empty when unwinding.
            for node in pending {
                if let Some(node) = node.upgrade() {
                    node.queued.set(false);
                }
            }
        }
    }

    Globals::with(|g| g.is_flushing = true);
    let mut guard = FlushGuard {
        touched: Vec::new(),
    };
    tracing::trace!("flush start");
    while let Some(node) = Globals::with(|g| g.refreshes.pop_front()) {
        let Some(node) = node.upgrade() else {
            continue;
        };
        node.queued.set(false);
        let passes = node.passes.get() + 1;
        node.passes.set(passes);
        if passes == 1 {
            guard.touched.push(Rc::downgrade(&node));
        }
        if passes > MAX_REFRESH_PASSES {
            tracing::error!(component = %node.tag(), passes, "runaway refresh loop");
            panic!(
                "component `{}` refreshed more than {MAX_REFRESH_PASSES} times in one update; a state setter is probably called unconditionally from render or an effect",
                node.tag()
            );
        }
        node.refresh();
    }
    tracing::trace!(components = guard.touched.len(), "flush end");
}
