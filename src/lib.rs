//! Component state, effects and shared context for a custom-element UI library.
//!
//! Change detection everywhere goes through [`deep_equal_iterative`], a stack-based structural
//! equality over [`Value`]s with cycle detection and configurable bailout thresholds.
//!
//! ```
//! use reblend::{deps, Component, Node, Subscription};
//!
//! let counter = Component::new("x-counter", |cx| {
//!     let count = cx.use_state(0);
//!     let c = count.clone();
//!     cx.use_effect(move || deps![c.get()], || Subscription::empty());
//!     move || vec![Node::text(&count.get().to_string())]
//! });
//! assert_eq!(counter.host().text_content(), "0");
//! ```

mod component;
mod context;
mod core;
mod effect;
mod equality;
mod error;
mod node;
mod state;
mod subscription;
mod value;

pub use component::*;
pub use context::*;
pub use crate::core::{batch, is_flushing, MAX_REFRESH_PASSES};
pub use effect::Memo;
pub use equality::*;
pub use error::Error;
pub use node::Node;
pub use state::*;
pub use subscription::*;
pub use value::*;

/// Builds a dependency list for [`Setup::use_effect`] and [`Setup::use_memo`].
///
/// Each expression is converted with `Value::from`.
#[macro_export]
macro_rules! deps {
    ($($e:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($e)),*]
    };
}
