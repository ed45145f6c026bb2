use std::{
    any::{type_name, Any},
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_ex::derive_ex;
use slabmap::SlabMap;

use crate::{component::Owner, core::batch, DeepEq, Error, Setup, State, Subscription};

#[cfg(test)]
mod tests;

/// A shared value that components can subscribe to without passing it down as props.
///
/// [`update`](Self::update) is gated by deep equality. When the value changes, each subscribed component
/// receives the new value in its own state slot and is refreshed, in subscription order.
#[derive_ex(Clone, bound())]
pub struct Context<T: 'static>(Rc<ContextNode<T>>);

struct ContextNode<T: 'static> {
    value: RefCell<T>,
    subscribers: RefCell<SlabMap<Subscriber<T>>>,
    next_seq: Cell<u64>,
}

struct Subscriber<T: 'static> {
    seq: u64,
    state: State<T>,
}

impl<T: DeepEq + Clone + 'static> Context<T> {
    pub fn new(initial: T) -> Self {
        Self(Rc::new(ContextNode {
            value: RefCell::new(initial),
            subscribers: RefCell::new(SlabMap::new()),
            next_seq: Cell::new(0),
        }))
    }

    pub fn get(&self) -> T {
        self.0.value.borrow().clone()
    }
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.0.value.borrow())
    }

    /// Replaces the value and notifies every subscriber, unless `value` is deeply equal to the current value.
    pub fn update(&self, value: T) {
        {
            let mut current = self.0.value.borrow_mut();
            if current.deep_eq(&value) {
                return;
            }
            *current = value.clone();
        }
        let mut subscribers: Vec<(u64, State<T>)> = self
            .0
            .subscribers
            .borrow()
            .values()
            .map(|s| (s.seq, s.state.clone()))
            .collect();
        subscribers.sort_by_key(|(seq, _)| *seq);
        tracing::debug!(subscribers = subscribers.len(), "context update");
        batch(|| {
            for (_, state) in subscribers {
                state.set(value.clone());
            }
        });
    }

    /// Computes the next value from the current one, then behaves like [`update`](Self::update).
    pub fn update_with(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.update(next);
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }

    /// Erases the value type, for storing contexts of different types together.
    pub fn to_any(&self) -> AnyContext {
        AnyContext(self.0.clone())
    }

    fn subscribe(&self, state: State<T>) -> Subscription {
        let seq = self.0.next_seq.get();
        self.0.next_seq.set(seq + 1);
        let key = self
            .0
            .subscribers
            .borrow_mut()
            .insert(Subscriber { seq, state });
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node| {
            node.subscribers.borrow_mut().remove(key);
        })
    }
}

/// A [`Context`] with its value type erased.
#[derive(Clone)]
pub struct AnyContext(Rc<dyn Any>);

impl AnyContext {
    pub fn downcast<T: DeepEq + Clone + 'static>(&self) -> Result<Context<T>, Error> {
        self.0
            .clone()
            .downcast::<ContextNode<T>>()
            .map(Context)
            .map_err(|_| Error::InvalidContext {
                expected: type_name::<T>(),
            })
    }
}

/// The current value of a context, as seen by one subscribed component.
#[derive_ex(Clone, bound())]
pub struct ContextValue<T: 'static>(State<T>);

impl<T: 'static> ContextValue<T> {
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

/// Updates a context on behalf of a component. Ignored once that component is torn down.
#[derive_ex(Clone, bound())]
pub struct ContextDispatch<T: 'static> {
    context: Context<T>,
    owner: Owner,
}

impl<T: DeepEq + Clone + 'static> ContextDispatch<T> {
    pub fn update(&self, value: T) {
        if !self.owner.is_torn_down() {
            self.context.update(value);
        }
    }
    pub fn update_with(&self, f: impl FnOnce(&T) -> T) {
        if !self.owner.is_torn_down() {
            self.context.update_with(f);
        }
    }
}

impl Setup {
    /// Subscribes the component to `context` and returns its live value.
    ///
    /// The subscription is released when the component is torn down.
    pub fn use_context<T: DeepEq + Clone + 'static>(&mut self, context: &Context<T>) -> ContextValue<T> {
        let state = State::new(context.get(), self.owner().clone());
        let subscription = context.subscribe(state.clone());
        self.push_subscription(subscription);
        ContextValue(state)
    }

    /// Like [`use_context`](Self::use_context), for a type-erased context.
    ///
    /// Fails with [`Error::InvalidContext`] if `context` does not hold a `Context<T>`.
    pub fn use_context_dyn<T: DeepEq + Clone + 'static>(
        &mut self,
        context: &AnyContext,
    ) -> Result<ContextValue<T>, Error> {
        let context = context.downcast::<T>()?;
        Ok(self.use_context(&context))
    }

    /// Returns a handle for updating `context` from this component without subscribing to it.
    pub fn use_context_dispatch<T: DeepEq + Clone + 'static>(
        &mut self,
        context: &Context<T>,
    ) -> ContextDispatch<T> {
        ContextDispatch {
            context: context.clone(),
            owner: self.owner().clone(),
        }
    }
}
