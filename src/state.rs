use std::{cell::RefCell, rc::Rc};

use derive_ex::derive_ex;

use crate::{component::Owner, DeepEq, Setup};


/// A state slot owned by one component.
///
/// Setting a value that is deeply equal to the stored one does nothing. Any other value is stored and
/// the owning component is refreshed. After the component is torn down every setter call is ignored.
#[derive_ex(Clone, bound())]
pub struct State<T: 'static>(Rc<StateNode<T>>);

struct StateNode<T> {
    value: RefCell<T>,
    owner: Owner,
}

impl<T: 'static> State<T> {
    pub(crate) fn new(value: T, owner: Owner) -> Self {
        Self(Rc::new(StateNode {
            value: RefCell::new(value),
            owner,
        }))
    }

    /// Gets the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Calls `f` with a reference to the current value.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.0.value.borrow())
    }

    /// Stores `value` without refreshing the owner.
    pub(crate) fn replace_silently(&self, value: T) {
        *self.0.value.borrow_mut() = value;
    }
}

impl<T: DeepEq + 'static> State<T> {
    /// Sets the value and refreshes the owning component if it changed.
    pub fn set(&self, value: T) {
        if self.0.owner.is_torn_down() {
            tracing::trace!("state set after teardown ignored");
            return;
        }
        {
            let mut current = self.0.value.borrow_mut();
            if current.deep_eq(&value) {
                return;
            }
            *current = value;
        }
        self.0.owner.notify();
    }

    /// Computes the next value from the current one, then behaves like [`set`](Self::set).
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if self.0.owner.is_torn_down() {
            return;
        }
        let next = self.with(f);
        self.set(next);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.value.try_borrow() {
            Ok(value) => std::fmt::Debug::fmt(&*value, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}

/// Sends actions to a reducer registered with [`Setup::use_reducer`].
#[derive_ex(Clone, bound())]
pub struct Dispatch<T: 'static, A: 'static> {
    state: State<T>,
    reducer: Rc<dyn Fn(&T, A) -> T>,
}

impl<T: DeepEq + 'static, A: 'static> Dispatch<T, A> {
    pub fn dispatch(&self, action: A) {
        self.state.update(|state| (self.reducer)(state, action));
    }

    /// Builds the action from the current state first.
    pub fn dispatch_with(&self, f: impl FnOnce(&T) -> A) {
        self.state.update(|state| {
            let action = f(state);
            (self.reducer)(state, action)
        });
    }
}

/// A mutable cell that lives as long as the component and never triggers a refresh.
#[derive_ex(Clone, bound())]
pub struct RefObject<T: 'static>(Rc<RefCell<T>>);

impl<T: 'static> RefObject<T> {
    pub fn current(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }
    pub fn set_current(&self, value: T) -> T {
        self.0.replace(value)
    }
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl Setup {
    /// Registers a state slot.
    pub fn use_state<T: DeepEq + 'static>(&mut self, initial: T) -> State<T> {
        State::new(initial, self.owner().clone())
    }

    /// Registers a state slot updated through `reducer`.
    ///
    /// The reducer's result goes through [`State::set`], so a result deeply equal to the current state does nothing.
    pub fn use_reducer<T: DeepEq + 'static, A: 'static>(
        &mut self,
        reducer: impl Fn(&T, A) -> T + 'static,
        initial: T,
    ) -> (State<T>, Dispatch<T, A>) {
        let state = self.use_state(initial);
        let dispatch = Dispatch {
            state: state.clone(),
            reducer: Rc::new(reducer),
        };
        (state, dispatch)
    }

    /// Registers a mutable cell that is not part of change detection.
    pub fn use_ref<T: 'static>(&mut self, initial: T) -> RefObject<T> {
        RefObject(Rc::new(RefCell::new(initial)))
    }
}
