use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and lifecycle errors of connected components.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A component was attached with a [Context](crate::Context) that
    /// carries no store, i.e. outside of any provider.
    #[error("no store in context, connected components must be attached below a provider")]
    MissingStore,

    #[error("component is already attached")]
    AlreadyAttached,

    #[error("component has been detached and cannot be attached again")]
    Detached,

    #[error("component has not been attached yet")]
    NotAttached,
}
