use parse_display::Display;

/// Errors reported by the component runtime.
#[non_exhaustive]
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle passed to [`Setup::use_context_dyn`](crate::Setup::use_context_dyn) is not a context of the requested type.
    #[display("invalid context: expected `Context<{expected}>`")]
    InvalidContext { expected: &'static str },

    /// The component has already been unmounted.
    #[display("component `{tag}` has been torn down")]
    TornDown { tag: String },
}

impl std::error::Error for Error {}
