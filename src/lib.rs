//! A minimal store container for component based user interfaces.
//!
//! A [Provider] owns a flat store [Record], and [Connect]ed components
//! subscribe to slices of it, asking the host framework to re-render
//! only when the props they derive from the store change.

#[macro_use]
mod value;
mod component;
mod connect;
mod context;
mod error;
mod listener;
mod logging;
mod meta;
mod projection;
mod provider;
pub mod shallow;
mod store;

pub use component::*;
pub use connect::*;
pub use context::*;
pub use error::*;
pub use listener::{Callback, Filter, Unsubscribe};
pub use logging::*;
pub use meta::*;
pub use projection::*;
pub use provider::*;
pub use store::{Dispatcher, Store, StoreRef};
pub use value::*;
