//! Error handling built on `thiserror` and `anyhow`.
//!
//! Domain errors describe what a collaborator reported; operational helpers add
//! context at the UI boundary, where failures are logged and degraded rather
//! than propagated.

pub mod domain;
pub mod operational;

pub use {
    domain::{ImageError, ProviderError, UiError, UpdateError},
    operational::{ErrorReporter, ResultExt},
};
