//! Diagnostic sink used by the specification engine.
//!
//! The engine reports progress and warnings through the [`Debugger`] trait.
//! [`DiagnosticFilter`] is the implementation the generator installs: it drops the
//! one diagnostic known to be noise and forwards everything else, timestamped.

use chrono::Local;
use std::fmt;
use std::io::{self, Write};

/// Substring of the engine diagnostic that is discarded by [`DiagnosticFilter`].
///
/// Routes registered with inline closures have no named signature to analyse. The
/// engine still documents their path and method and says so with this warning,
/// which fires once per closure route in most real projects.
pub const BENIGN_DIAGNOSTIC: &str = "failed to resolve closure handler";

/// Logging callback accepted by the specification engine.
pub trait Debugger {
    /// Receives one formatted diagnostic message.
    fn printf(&mut self, args: fmt::Arguments<'_>);
}

/// Forwards engine diagnostics to a writer, prefixed with a local timestamp,
/// except those containing [`BENIGN_DIAGNOSTIC`].
pub struct DiagnosticFilter<W: Write> {
    out: W,
}

impl DiagnosticFilter<io::Stderr> {
    /// Filter writing to the process's standard error stream.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> DiagnosticFilter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Debugger for DiagnosticFilter<W> {
    fn printf(&mut self, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        if message.contains(BENIGN_DIAGNOSTIC) {
            return;
        }
        let stamp = Local::now().format("%Y/%m/%d %H:%M:%S");
        // A broken diagnostic stream must not abort generation.
        let _ = writeln!(self.out, "{} {}", stamp, message);
    }
}

/// Sink that discards everything. Handy for library callers and tests.
pub struct NullDebugger;

impl Debugger for NullDebugger {
    fn printf(&mut self, _args: fmt::Arguments<'_>) {}
}
