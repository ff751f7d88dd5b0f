pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod location;
pub mod logging;

pub use crate::context::UiContext;
pub use crate::core::{JobsParams, UiStateStore};
pub use crate::error::StateError;
pub use crate::location::{QueryLocation, UrlLocation};
