//! reporting strategies
//!
//! The resolver itself never prints or exits. A [Reporter] decides what a user gets to see when
//! resolution ends without a descriptor, and the caller turns the returned [Exit] into a process status.
use crate::error::ResolveError;
use std::cell::RefCell;
use std::io::{Stderr, Stdout, Write};

/// How a run ended when it did not produce a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// help or version was requested
    Success,
    Failure,
}

impl From<Exit> for std::process::ExitCode {
    fn from(value: Exit) -> Self {
        match value {
            Exit::Success => std::process::ExitCode::SUCCESS,
            Exit::Failure => std::process::ExitCode::FAILURE,
        }
    }
}

pub trait Reporter {
    /// Help or version text
    fn info(&self, text: &str) -> Exit;

    /// A failed resolution, together with the full usage text
    fn failure(&self, error: &ResolveError, usage: &str) -> Exit;
}

/// Prints help, version and failures to a pair of writers, the terminal by default
#[derive(Debug)]
pub struct Interactive<O = Stdout, E = Stderr> {
    out: RefCell<O>,
    err: RefCell<E>,
}

impl Interactive {
    pub fn terminal() -> Self {
        Interactive::with_writers(std::io::stdout(), std::io::stderr())
    }
}

impl Default for Interactive {
    fn default() -> Self {
        Interactive::terminal()
    }
}

impl<O: Write, E: Write> Interactive<O, E> {
    pub fn with_writers(out: O, err: E) -> Self {
        Interactive {
            out: RefCell::new(out),
            err: RefCell::new(err),
        }
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out.into_inner(), self.err.into_inner())
    }
}

impl<O: Write, E: Write> Reporter for Interactive<O, E> {
    fn info(&self, text: &str) -> Exit {
        let written = writeln!(self.out.borrow_mut(), "{}", text.trim_end());
        if let Err(e) = written {
            tracing::warn!(error = %e, "cannot print");
        }
        Exit::Success
    }

    fn failure(&self, error: &ResolveError, usage: &str) -> Exit {
        let mut err = self.err.borrow_mut();
        let written = writeln!(err, "{}", capitalize(&error.to_string()))
            .and_then(|()| writeln!(err, "{}", usage.trim_end()));
        if let Err(e) = written {
            tracing::warn!(error = %e, "cannot print");
        }
        Exit::Failure
    }
}

/// Stays silent, for tests and embedding
#[derive(Debug, Default, Clone, Copy)]
pub struct Quiet;

impl Reporter for Quiet {
    fn info(&self, _text: &str) -> Exit {
        Exit::Success
    }

    fn failure(&self, error: &ResolveError, _usage: &str) -> Exit {
        tracing::trace!(%error, "resolution failed");
        Exit::Failure
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
