use std::{
    mem::take,
    rc::{Rc, Weak},
};

#[cfg(test)]
mod tests;

/// Releases a resource when dropped.
///
/// Effects return a `Subscription` as their cleanup: it is dropped right before the effect runs again
/// and when the component is torn down.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    /// A subscription that does nothing when dropped.
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    /// Calls `f` when dropped.
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
    /// Calls `release` with `this` when dropped, if `this` is still alive.
    pub fn from_weak_fn<T: 'static>(this: Weak<T>, release: impl Fn(Rc<T>) + 'static) -> Self {
        Subscription::from_fn(move || {
            if let Some(this) = this.upgrade() {
                release(this)
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0, RawSubscription::Empty)
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
}
