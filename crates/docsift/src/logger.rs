//! Diagnostic hook called by the dispatcher.
//!
//! The engine reports notable events through a [`Logger`]. The default is
//! [`NoopLogger`]; [`TracingLogger`] forwards events to `tracing` so they reach
//! whatever subscriber the host application installed.
//!
//! Fields are passed as key/value pairs, so every key always has a value.
//!
//! ```rust
//! use docsift::logger::{Logger, TracingLogger};
//!
//! let logger = TracingLogger;
//! logger.info("extracted", &[("name", &"report.pdf"), ("images", &3)]);
//! ```

use std::fmt::{Display, Write as FmtWrite};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Structured key/value context for one event.
pub type Fields<'a> = &'a [(&'a str, &'a dyn Display)];

pub trait Logger: Send + Sync {
    fn info(&self, msg: &str, fields: Fields<'_>);
    fn debug(&self, msg: &str, fields: Fields<'_>);
    fn error(&self, msg: &str, fields: Fields<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _msg: &str, _fields: Fields<'_>) {}
    fn debug(&self, _msg: &str, _fields: Fields<'_>) {}
    fn error(&self, _msg: &str, _fields: Fields<'_>) {}
}

/// Emits each event as a `tracing` event with target `docsift`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str, fields: Fields<'_>) {
        tracing::info!(target: "docsift", fields = %render_fields(fields), "{}", msg);
    }

    fn debug(&self, msg: &str, fields: Fields<'_>) {
        tracing::debug!(target: "docsift", fields = %render_fields(fields), "{}", msg);
    }

    fn error(&self, msg: &str, fields: Fields<'_>) {
        tracing::error!(target: "docsift", fields = %render_fields(fields), "{}", msg);
    }
}

/// Render pairs as `k1=v1 k2=v2`.
pub fn render_fields(fields: Fields<'_>) -> String {
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}={}", key, value);
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Level {
    Info,
    Debug,
    Error,
}

/// Call the hook without letting a panicking implementation escape.
pub(crate) fn emit(logger: &dyn Logger, level: Level, msg: &str, fields: Fields<'_>) {
    let _ = catch_unwind(AssertUnwindSafe(|| match level {
        Level::Info => logger.info(msg, fields),
        Level::Debug => logger.debug(msg, fields),
        Level::Error => logger.error(msg, fields),
    }));
}
