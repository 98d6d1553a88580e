//! Sealed marker for [`Transport`](super::Transport) implementations.

pub(crate) mod private {
    /// Implemented only inside this crate, so every transport applies the
    /// same URL, path and header checks.
    pub trait Sealed {}
}
