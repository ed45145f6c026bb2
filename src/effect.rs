use std::mem::take;

use crate::{deep_equal_iterative, EqualityConfig, Setup, State, Subscription, Value};


/// An entry of a component's effect list, visited in registration order on every refresh.
pub(crate) trait Hook {
    fn refresh(&mut self);
}

struct EffectHook<D, F> {
    deps: D,
    f: F,
    config: EqualityConfig,
    snapshot: Option<Value>,
    cleanup: Subscription,
}

impl<D, F> Hook for EffectHook<D, F>
where
    D: Fn() -> Vec<Value>,
    F: FnMut() -> Subscription,
{
    fn refresh(&mut self) {
        let deps = Value::array((self.deps)());
        if let Some(snapshot) = &self.snapshot {
            if deep_equal_iterative(snapshot, &deps, &self.config) {
                return;
            }
        }
        // Recorded before running so a refresh triggered from inside the effect does not run it again.
        self.snapshot = Some(deps);
        drop(take(&mut self.cleanup));
        tracing::trace!("run effect");
        self.cleanup = (self.f)();
    }
}

struct MemoHook<T: 'static, D, F> {
    deps: D,
    compute: F,
    snapshot: Vec<Value>,
    state: State<T>,
}

impl<T, D, F> Hook for MemoHook<T, D, F>
where
    T: 'static,
    D: Fn() -> Vec<Value>,
    F: Fn() -> T,
{
    fn refresh(&mut self) {
        let deps = (self.deps)();
        if !deps_changed(&self.snapshot, &deps) {
            return;
        }
        self.snapshot = deps;
        self.state.replace_silently((self.compute)());
    }
}

/// Element-wise identity comparison of two dependency lists.
fn deps_changed(prev: &[Value], next: &[Value]) -> bool {
    prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| !a.strict_eq(b))
}

/// A memoized value registered with [`Setup::use_memo`].
pub struct Memo<T: 'static>(State<T>);

impl<T: 'static> Memo<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.get()
    }
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        self.0.with(f)
    }
}
impl<T: 'static> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Setup {
    /// Registers an effect.
    ///
    /// `deps` is evaluated on every refresh and compared with the previous dependency list using
    /// [`deep_equal_iterative`]. `effect` runs on mount and whenever the comparison reports a difference.
    /// The [`Subscription`] it returns is dropped before the next run and when the component is torn down.
    pub fn use_effect(
        &mut self,
        deps: impl Fn() -> Vec<Value> + 'static,
        effect: impl FnMut() -> Subscription + 'static,
    ) {
        self.use_effect_with_config(EqualityConfig::default(), deps, effect)
    }

    /// Registers an effect whose dependency comparison uses `config`.
    ///
    /// With thresholds set, large or deep dependencies fall back to identity and make the effect run.
    pub fn use_effect_with_config(
        &mut self,
        config: EqualityConfig,
        deps: impl Fn() -> Vec<Value> + 'static,
        effect: impl FnMut() -> Subscription + 'static,
    ) {
        self.push_hook(EffectHook {
            deps,
            f: effect,
            config,
            snapshot: None,
            cleanup: Subscription::empty(),
        });
    }

    /// Registers a memoized value.
    ///
    /// `compute` runs immediately, and again on a refresh where some element of `deps` is not
    /// [`strict_eq`](Value::strict_eq) to the previous one.
    pub fn use_memo<T: 'static>(
        &mut self,
        deps: impl Fn() -> Vec<Value> + 'static,
        compute: impl Fn() -> T + 'static,
    ) -> Memo<T> {
        let snapshot = deps();
        let state = State::new(compute(), self.owner().clone());
        self.push_hook(MemoHook {
            deps,
            compute,
            snapshot,
            state: state.clone(),
        });
        Memo(state)
    }
}
