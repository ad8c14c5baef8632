//! # occi-cli - argument resolver for an OCCI client
//!
//! Turns the command line of the `occi` client into a validated [RequestDescriptor]. Sending the request
//! and rendering the response happen elsewhere.
//!
//! ## Introduction for developers
//!
//! ### Flow
//!
//! ```text
//! args ─> options::Options (clap) ─> flag handlers ─> DescriptorBuilder ─> validate ─> RequestDescriptor
//!                                    (left to right)
//!                                        │
//!                                        ├─ mixin::Mixin::parse        SCHEME#TERM
//!                                        ├─ attribute::Attribute::parse KEY=VALUE
//!                                        └─ context::parse              KEY=VALUE, file://, base64
//! ```
//!
//! ### Flags
//!
//! The flag table lives in [options::Options]. Value domains:
//! - plain strings (`--resource`, `--trigger-action`, ...)
//! - paths that must exist and be readable (`--ca-path`, `--ca-file`, `--user-cred`)
//! - closed sets ([descriptor::AuthMethod], [descriptor::Action], [descriptor::MediaType], ...)
//! - comma separated lists (`--attribute`, `--context`, `--mixin`, `--link`)
//!
//! Passing `--mixin a,b` is the same as `--mixin a --mixin b`. Scalar flags given twice keep the last value.
//!
//! ### Errors
//!
//! Flags are handled left to right. Malformed tokens, unreadable paths and unknown enum values abort at
//! the point where they occur, so an earlier bad flag is reported before a later one. Cross-field rules
//! are checked after all flags were applied; missing mandatory fields are reported as one batch.
//! See [error] for the taxonomy.
//!
//! ### Reporting
//!
//! [resolve] returns a [Resolution] or a [ResolveError] and has no other side effects than reading files.
//! [run] hands failures to a [report::Reporter]: [report::Interactive] prints the message and usage text,
//! [report::Quiet] prints nothing. Neither terminates the process.
//!
//! ```
//! use occi_cli::{descriptor::Environment, report::Quiet};
//!
//! let descriptor = occi_cli::run(
//!     ["--action", "list", "--resource", "compute", "--auth", "x509"],
//!     &Environment::default(),
//!     &Quiet,
//! )
//! .expect("valid arguments");
//!
//! assert_eq!(descriptor.resource.as_deref(), Some("compute"));
//! ```
pub mod attribute;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod mixin;
pub mod options;
pub mod output;
pub mod report;
mod validate;

pub use descriptor::{DescriptorBuilder, RequestDescriptor};
pub use error::ResolveError;

use options::{Dispatched, Options};
use report::{Exit, Reporter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of a successful resolution
#[derive(Debug)]
pub enum Resolution {
    Request(RequestDescriptor),
    Help(String),
    Version(String),
}

/// Resolves `args` (without the program name) into a descriptor
pub fn resolve<I, T>(
    args: I,
    env: &descriptor::Environment,
) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let mut builder = DescriptorBuilder::new(env);
    match Options::dispatch(args, &mut builder)? {
        Dispatched::Complete => {}
        Dispatched::Help(text) => return Ok(Resolution::Help(text)),
        Dispatched::Version => return Ok(Resolution::Version(VERSION.to_string())),
    }

    let descriptor = builder.finish()?;
    tracing::debug!(action = ?descriptor.action, resource = ?descriptor.resource, "request resolved");

    Ok(Resolution::Request(descriptor))
}

/// Like [resolve], but every outcome without a descriptor goes through `reporter`
pub fn run<I, T>(
    args: I,
    env: &descriptor::Environment,
    reporter: &dyn Reporter,
) -> Result<RequestDescriptor, Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match resolve(args, env) {
        Ok(Resolution::Request(descriptor)) => Ok(descriptor),
        Ok(Resolution::Help(text)) | Ok(Resolution::Version(text)) => Err(reporter.info(&text)),
        Err(err) => Err(reporter.failure(&err, &Options::usage())),
    }
}
