use std::{
    cell::{Cell, RefCell},
    mem::take,
    rc::{Rc, Weak},
};

use parse_display::Display;

use crate::{core::schedule_refresh, effect::Hook, Error, Node, Subscription};


/// The phase a component instance is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[display(style = "snake_case")]
pub enum Lifecycle {
    /// The setup closure is running and hooks are being registered.
    Constructing,
    /// Waiting for a state change.
    Idle,
    /// Effects and render are running.
    Refreshing,
    /// Removed. State, effects and context subscriptions have been released.
    TornDown,
}
impl Lifecycle {
    pub fn is_mounted(self) -> bool {
        matches!(self, Lifecycle::Idle | Lifecycle::Refreshing)
    }
}

type RenderFn = Box<dyn FnMut() -> Vec<Node>>;

/// A component instance rendering into its own host node.
///
/// The setup closure runs exactly once. It registers state, effects and context subscriptions on the
/// [`Setup`] it receives, and returns the render closure. The first refresh (the mount) runs every effect
/// and appends the render output to [`host`](Self::host).
///
/// Dropping the `Component` unmounts it.
pub struct Component(Rc<ComponentNode>);

impl Component {
    pub fn new<R>(tag: &str, setup: impl FnOnce(&mut Setup) -> R) -> Self
    where
        R: FnMut() -> Vec<Node> + 'static,
    {
        let host = Node::element(tag);
        let lifecycle = Rc::new(Cell::new(Lifecycle::Constructing));
        let node = Rc::new_cyclic(move |this| {
            let mut s = Setup::new(Owner {
                node: this.clone(),
                lifecycle: lifecycle.clone(),
            });
            let render = setup(&mut s);
            ComponentNode {
                host,
                lifecycle,
                queued: Cell::new(false),
                passes: Cell::new(0),
                hooks: RefCell::new(s.hooks),
                subscriptions: RefCell::new(s.subscriptions),
                render: RefCell::new(Some(Box::new(render))),
            }
        });
        node.lifecycle.set(Lifecycle::Idle);
        tracing::debug!(
            component = %node.tag(),
            lifecycle = %node.lifecycle.get(),
            hooks = node.hooks.borrow().len(),
            "mount"
        );
        schedule_refresh(&node);
        Self(node)
    }

    /// The host node the render output is appended to.
    pub fn host(&self) -> Node {
        self.0.host.clone()
    }
    pub fn tag(&self) -> &str {
        self.0.tag()
    }
    pub fn lifecycle(&self) -> Lifecycle {
        self.0.lifecycle.get()
    }
    pub fn is_mounted(&self) -> bool {
        self.lifecycle().is_mounted()
    }

    /// Requests a refresh without a state change.
    pub fn refresh(&self) -> Result<(), Error> {
        if self.lifecycle() == Lifecycle::TornDown {
            return Err(Error::TornDown {
                tag: self.tag().to_string(),
            });
        }
        schedule_refresh(&self.0);
        Ok(())
    }

    /// Tears the component down: releases context subscriptions, runs effect cleanups in registration
    /// order and empties the host node. Calling it again has no effect.
    pub fn unmount(&self) {
        self.0.teardown();
    }
}
impl Drop for Component {
    fn drop(&mut self) {
        self.0.teardown();
    }
}

pub(crate) struct ComponentNode {
    host: Node,
    lifecycle: Rc<Cell<Lifecycle>>,
    pub(crate) queued: Cell<bool>,
    pub(crate) passes: Cell<usize>,
    hooks: RefCell<Vec<Box<dyn Hook>>>,
    subscriptions: RefCell<Vec<Subscription>>,
    render: RefCell<Option<RenderFn>>,
}

impl ComponentNode {
    pub(crate) fn tag(&self) -> &str {
        self.host.tag()
    }
    fn is_torn_down(&self) -> bool {
        self.lifecycle.get() == Lifecycle::TornDown
    }

    pub(crate) fn refresh(self: &Rc<Self>) {
        if self.is_torn_down() {
            return;
        }
        self.lifecycle.set(Lifecycle::Refreshing);
        tracing::trace!(component = %self.tag(), "refresh");
        self.run_hooks();
        if !self.is_torn_down() {
            self.render();
        }
        if self.is_torn_down() {
            // teardown requested while the hooks or the render closure were in use
            self.release();
        } else {
            self.lifecycle.set(Lifecycle::Idle);
        }
    }
    fn run_hooks(&self) {
        let mut hooks = self.hooks.borrow_mut();
        for hook in hooks.iter_mut() {
            if self.is_torn_down() {
                break;
            }
            hook.refresh();
        }
    }
    fn render(&self) {
        let mut render = self.render.borrow_mut();
        let Some(render) = render.as_mut() else {
            return;
        };
        self.host.clear();
        let nodes = render();
        self.host.append_all(nodes);
    }

    fn teardown(&self) {
        let previous = self.lifecycle.replace(Lifecycle::TornDown);
        if previous == Lifecycle::TornDown {
            return;
        }
        tracing::debug!(component = %self.tag(), from = %previous, "unmount");
        let subscriptions = take(&mut *self.subscriptions.borrow_mut());
        drop(subscriptions);
        self.release();
    }
    fn release(&self) {
        let (hooks, render) = {
            let (Ok(mut hooks), Ok(mut render)) =
                (self.hooks.try_borrow_mut(), self.render.try_borrow_mut())
            else {
                return;
            };
            (take(&mut *hooks), render.take())
        };
        drop(hooks);
        drop(render);
        self.host.clear();
    }
}

/// Back-reference from a hook handle to the component that owns it.
#[derive(Clone)]
pub(crate) struct Owner {
    node: Weak<ComponentNode>,
    lifecycle: Rc<Cell<Lifecycle>>,
}
impl Owner {
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }
    pub(crate) fn is_torn_down(&self) -> bool {
        self.lifecycle() == Lifecycle::TornDown
    }

    /// Requests a refresh of the owner.
    ///
    /// Ignored while the owner is being constructed (the mount refresh follows) and after teardown.
    pub(crate) fn notify(&self) {
        if !self.lifecycle().is_mounted() {
            return;
        }
        if let Some(node) = self.node.upgrade() {
            schedule_refresh(&node);
        }
    }
}

/// Registers hooks for the component under construction.
///
/// A `Setup` exists only while the setup closure passed to [`Component::new`] runs,
/// so hooks cannot be registered conditionally after construction or outside a component.
pub struct Setup {
    owner: Owner,
    hooks: Vec<Box<dyn Hook>>,
    subscriptions: Vec<Subscription>,
}

impl Setup {
    fn new(owner: Owner) -> Self {
        Self {
            owner,
            hooks: Vec::new(),
            subscriptions: Vec::new(),
        }
    }
    pub(crate) fn owner(&self) -> &Owner {
        &self.owner
    }
    pub(crate) fn push_hook(&mut self, hook: impl Hook + 'static) {
        self.hooks.push(Box::new(hook));
    }
    /// Keeps `subscription` alive until the component is torn down.
    pub fn push_subscription(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Returns a flag that reports whether the component is still mounted.
    ///
    /// Use it to guard work that completes asynchronously.
    pub fn use_mounted(&mut self) -> Mounted {
        Mounted(self.owner.lifecycle.clone())
    }

    /// Returns a handle that refreshes the component without changing any state.
    pub fn use_force_update(&mut self) -> ForceUpdate {
        ForceUpdate(self.owner.clone())
    }
}

#[derive(Clone)]
pub struct Mounted(Rc<Cell<Lifecycle>>);

impl Mounted {
    pub fn is_mounted(&self) -> bool {
        self.0.get().is_mounted()
    }
}

#[derive(Clone)]
pub struct ForceUpdate(Owner);

impl ForceUpdate {
    pub fn force_update(&self) {
        self.0.notify();
    }
}
