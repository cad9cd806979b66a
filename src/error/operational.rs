//! Operational error context propagation with `anyhow`.
//!
//! Collaborator failures never reach the user as hard errors. This module adds
//! context to them and logs them at the point where they are degraded.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{debug, error, warn},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Logs the error as a warning and falls back to the default value.
    fn or_degrade(self, context: &str) -> T
    where
        T: Default,
        E: Display;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }

    fn or_degrade(self, context: &str) -> T
    where
        T: Default,
        E: Display,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                warn!(context = context, error = %e, "Degrading to default value");
                T::default()
            }
        }
    }
}

/// Centralized error reporting and logging.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a debug-level error.
    pub fn debug(error: &Error, context: &str) {
        debug!(context = context, error = %error, "Debug error");
    }

    /// Reports a recoverable issue.
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %error, "Warning error");
    }

    /// Reports a non-recoverable issue.
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = %error, "Error error");
    }

    /// Converts an error chain to a single line suitable for a dialog body.
    pub fn to_user_message(error: &Error) -> String {
        error
            .chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }
}
