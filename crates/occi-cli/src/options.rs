//! occi flag table and dispatch
//!
//! [Options] declares every flag with its value domain. Dispatching feeds the parsed values into a
//! [DescriptorBuilder] in command line order, calling the mini parsers for list-valued flags and checking
//! paths on the way.
use crate::attribute::Attribute;
use crate::descriptor::{Action, AuthMethod, DescriptorBuilder, LogTarget, MediaType};
use crate::error::{EnumError, FileAccessError, FileProblem, FormatError, ResolveError};
use crate::mixin::Mixin;
use crate::output::OutputFormat;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const EXAMPLES: &str = "\
Examples:

occi --endpoint https://localhost:3300/ --action list --resource os_tpl --auth x509

occi --endpoint https://localhost:3300/ --action list --resource resource_tpl --auth x509

occi --endpoint https://localhost:3300/ --action describe --resource os_tpl#debian6 --auth x509

occi --endpoint https://localhost:3300/ --action create --resource compute --mixin os_tpl#debian6 --mixin resource_tpl#small --attribute title=\"My rOCCI VM\" --auth x509

occi --endpoint https://localhost:3300/ --action delete --resource /compute/65sd4f654sf65g4-s5fg65sfg465sfg-sf65g46sf5g4sdfg --auth x509";

#[derive(Parser, Debug)]
#[command(
    name = "occi",
    about = "OCCI command line client",
    after_help = EXAMPLES,
    args_override_self = true
)]
pub struct Options {
    /// OCCI server URI, defaults to 'https://localhost:3300/'
    #[arg(short = 'e', long = "endpoint", value_name = "URI")]
    pub endpoint: Option<String>,

    /// Authentication method, defaults to 'none'
    #[arg(short = 'n', long = "auth", value_name = "METHOD")]
    pub auth: Option<AuthMethod>,

    /// Username for basic or digest authentication, defaults to 'anonymous'
    #[arg(short = 'u', long = "username", value_name = "USER")]
    pub username: Option<String>,

    /// Password for basic, digest and x509 authentication
    #[arg(short = 'p', long = "password", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Path to CA certificates directory, defaults to '/etc/grid-security/certificates'
    #[arg(short = 'c', long = "ca-path", value_name = "PATH")]
    pub ca_path: Option<PathBuf>,

    /// Path to CA certificates in a file
    #[arg(short = 'f', long = "ca-file", value_name = "PATH")]
    pub ca_file: Option<PathBuf>,

    /// Category type identifier to filter categories from model, must be used together with the -m option
    #[arg(short = 'F', long = "filter", value_name = "CATEGORY")]
    pub filter: Option<String>,

    /// Path to user's x509 credentials, defaults to '$HOME/.globus/usercred.pem'
    #[arg(short = 'x', long = "user-cred", value_name = "FILE")]
    pub user_cred: Option<PathBuf>,

    /// Using VOMS credentials; modifies behavior of the X509 authN module
    #[arg(short = 'X', long = "voms")]
    pub voms: bool,

    /// Media type for client <-> server communication, defaults to 'text/plain,text/occi'
    #[arg(short = 'y', long = "media-type", value_name = "MEDIA_TYPE")]
    pub media_type: Option<MediaType>,

    /// Resource to be queried (e.g. network, compute, storage etc.), required
    #[arg(short = 'r', long = "resource", value_name = "RESOURCE")]
    pub resource: Option<String>,

    /// Comma separated attributes for new resources such as title="Name", required
    #[arg(short = 't', long = "attribute", value_name = "ATTRS", value_delimiter = ',')]
    pub attributes: Vec<String>,

    /// Comma separated context variables for new compute resources such as public_key="ssh-rsa dfsdf...adfdf== user@localhost"
    #[arg(short = 'T', long = "context", value_name = "CTX_VARS", value_delimiter = ',')]
    pub context: Vec<String>,

    /// Action to be performed on the resource, required
    #[arg(short = 'a', long = "action", value_name = "ACTION")]
    pub action: Option<Action>,

    /// Type and name of the mixin as SCHEME#NAME (e.g. http://localhost/os_tpl#monitoring)
    #[arg(short = 'M', long = "mixin", value_name = "NAME", value_delimiter = ',')]
    pub mixins: Vec<String>,

    /// Link specified resource to the resource being created, only for action CREATE and resource COMPUTE
    #[arg(short = 'j', long = "link", value_name = "URI", value_delimiter = ',')]
    pub links: Vec<String>,

    /// Action to be triggered on the resource
    #[arg(short = 'g', long = "trigger-action", value_name = "TRIGGER")]
    pub trigger_action: Option<String>,

    /// Log to the specified device, defaults to 'stderr'
    #[arg(short = 'l', long = "log-to", value_name = "OUTPUT")]
    pub log_to: Option<LogTarget>,

    /// Output format, defaults to human-readable 'plain'
    #[arg(short = 'o', long = "output-format", value_name = "FORMAT")]
    pub output_format: Option<OutputFormat>,

    /// Contact the endpoint and dump its model
    #[arg(short = 'm', long = "dump-model")]
    pub dump_model: bool,

    /// Enable debugging messages
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Be more verbose, less intrusive than debug mode
    #[arg(short = 'b', long = "verbose")]
    pub verbose: bool,

    /// Show version
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

/// How dispatching the command line ended
#[derive(Debug)]
pub(crate) enum Dispatched {
    Complete,
    Help(String),
    Version,
}

/// One flag occurrence, handlers run in command line order
#[derive(Debug, Clone, PartialEq)]
enum Flag {
    Endpoint(String),
    Auth(AuthMethod),
    Username(String),
    Password(String),
    CaPath(PathBuf),
    CaFile(PathBuf),
    Filter(String),
    UserCred(PathBuf),
    Voms,
    MediaType(MediaType),
    Resource(String),
    Attribute(String),
    Context(String),
    Action(Action),
    Mixin(String),
    Link(String),
    TriggerAction(String),
    LogTo(LogTarget),
    OutputFormat(OutputFormat),
    DumpModel,
    Debug,
    Verbose,
    Version,
}

impl Options {
    /// Parses `args` and runs every flag's handler against the builder, left to right
    ///
    /// The first failing handler aborts. When clap rejects a token, the handlers of the flags before it
    /// still run first, so their errors win over the rejected token.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn dispatch<I, T>(
        args: I,
        builder: &mut DescriptorBuilder,
    ) -> Result<Dispatched, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let err = match matches_from(&args) {
            Ok(matches) => return run_handlers(&matches, builder),
            Err(err) => err,
        };

        // the empty prefix always parses
        let accepted = (0..args.len())
            .rev()
            .find_map(|end| matches_from(&args[..end]).ok());
        if let Some(matches) = accepted {
            if let Dispatched::Version = run_handlers(&matches, builder)? {
                return Ok(Dispatched::Version);
            }
        }

        match err.kind() {
            ErrorKind::DisplayHelp => Ok(Dispatched::Help(err.render().to_string())),
            _ => Err(from_clap(err)),
        }
    }

    /// Full help text, also printed along with failures
    pub fn usage() -> String {
        Options::command().render_help().to_string()
    }
}

fn matches_from(args: &[OsString]) -> Result<ArgMatches, clap::Error> {
    let program = std::iter::once(OsString::from("occi"));
    Options::command().try_get_matches_from(program.chain(args.iter().cloned()))
}

fn run_handlers(
    matches: &ArgMatches,
    builder: &mut DescriptorBuilder,
) -> Result<Dispatched, ResolveError> {
    for flag in Occurrences::collect(matches) {
        if let Flag::Version = flag {
            return Ok(Dispatched::Version);
        }
        flag.apply(builder)?;
    }

    Ok(Dispatched::Complete)
}

/// Flags given on the command line, keyed by their position
struct Occurrences<'m> {
    matches: &'m ArgMatches,
    found: Vec<(usize, Flag)>,
}

impl<'m> Occurrences<'m> {
    fn collect(matches: &'m ArgMatches) -> Vec<Flag> {
        let mut occurrences = Occurrences {
            matches,
            found: vec![],
        };

        occurrences
            .scalar("endpoint", Flag::Endpoint)
            .scalar("auth", Flag::Auth)
            .scalar("username", Flag::Username)
            .scalar("password", Flag::Password)
            .scalar("ca_path", Flag::CaPath)
            .scalar("ca_file", Flag::CaFile)
            .scalar("filter", Flag::Filter)
            .scalar("user_cred", Flag::UserCred)
            .switch("voms", Flag::Voms)
            .scalar("media_type", Flag::MediaType)
            .scalar("resource", Flag::Resource)
            .list("attributes", Flag::Attribute)
            .list("context", Flag::Context)
            .scalar("action", Flag::Action)
            .list("mixins", Flag::Mixin)
            .list("links", Flag::Link)
            .scalar("trigger_action", Flag::TriggerAction)
            .scalar("log_to", Flag::LogTo)
            .scalar("output_format", Flag::OutputFormat)
            .switch("dump_model", Flag::DumpModel)
            .switch("debug", Flag::Debug)
            .switch("verbose", Flag::Verbose)
            .switch("version", Flag::Version);

        let mut found = occurrences.found;
        found.sort_by_key(|(index, _)| *index);
        found.into_iter().map(|(_, flag)| flag).collect()
    }

    fn given(&self, id: &str) -> bool {
        self.matches.value_source(id) == Some(ValueSource::CommandLine)
    }

    /// Repeated scalars override each other, only the last occurrence is left
    fn scalar<T>(&mut self, id: &str, flag: fn(T) -> Flag) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        if !self.given(id) {
            return self;
        }

        let index = self.matches.indices_of(id).and_then(|indices| indices.last());
        if let (Some(index), Some(value)) = (index, self.matches.get_one::<T>(id)) {
            self.found.push((index, flag(value.clone())));
        }
        self
    }

    /// Every value of a list flag keeps its own position, also when split at commas
    fn list(&mut self, id: &str, flag: fn(String) -> Flag) -> &mut Self {
        if !self.given(id) {
            return self;
        }

        if let (Some(indices), Some(values)) = (
            self.matches.indices_of(id),
            self.matches.get_many::<String>(id),
        ) {
            self.found.extend(indices.zip(values.cloned().map(flag)));
        }
        self
    }

    fn switch(&mut self, id: &str, flag: Flag) -> &mut Self {
        if !self.given(id) || !self.matches.get_flag(id) {
            return self;
        }

        if let Some(index) = self.matches.indices_of(id).and_then(|indices| indices.last()) {
            self.found.push((index, flag));
        }
        self
    }
}

impl Flag {
    fn apply(self, builder: &mut DescriptorBuilder) -> Result<(), ResolveError> {
        match self {
            Flag::Endpoint(endpoint) => {
                let url = url::Url::parse(&endpoint).map_err(|source| FormatError::Endpoint {
                    value: endpoint.clone(),
                    source,
                })?;
                builder.endpoint(url);
            }
            Flag::Auth(method) => {
                builder.auth_method(method);
            }
            Flag::Username(username) => {
                builder.username(username);
            }
            Flag::Password(password) => {
                builder.password(password);
            }
            Flag::CaPath(ca_path) => {
                builder.ca_path(readable_directory("--ca-path", ca_path)?);
            }
            Flag::CaFile(ca_file) => {
                builder.ca_file(readable_file("--ca-file", ca_file)?);
            }
            Flag::Filter(filter) => {
                builder.filter(filter);
            }
            Flag::UserCred(user_cred) => {
                builder.user_cert(readable_file("--user-cred", user_cred)?);
            }
            Flag::Voms => {
                builder.voms(true);
            }
            Flag::MediaType(media_type) => {
                builder.media_type(media_type);
            }
            Flag::Resource(resource) => {
                builder.resource(resource);
            }
            Flag::Attribute(token) => {
                let attribute = Attribute::parse(&token).map_err(FormatError::from)?;
                builder.insert_attribute(attribute.key, attribute.value);
            }
            Flag::Context(token) => {
                if let Some((key, value)) = crate::context::parse(&token)? {
                    builder.insert_context_var(key, value);
                }
            }
            Flag::Action(action) => {
                builder.action(action);
            }
            Flag::Mixin(token) => {
                builder.add_mixin(Mixin::parse(&token).map_err(FormatError::from)?);
            }
            Flag::Link(link) => {
                builder.add_link(link_path(&link)?);
            }
            Flag::TriggerAction(trigger_action) => {
                builder.trigger_action(trigger_action);
            }
            Flag::LogTo(target) => {
                builder.log_target(target);
            }
            Flag::OutputFormat(output_format) => {
                builder.output_format(output_format);
            }
            Flag::DumpModel => {
                builder.dump_model(true);
            }
            Flag::Debug => {
                builder.verbosity(true, false);
            }
            Flag::Verbose => {
                builder.verbosity(false, true);
            }
            Flag::Version => {}
        }

        Ok(())
    }
}

fn from_clap(err: clap::Error) -> ResolveError {
    let context = |kind| match err.get(kind) {
        Some(ContextValue::String(value)) => Some(value.clone()),
        _ => None,
    };

    // clap also reports a missing value as InvalidValue, just without the value
    let invalid_value = context(ContextKind::InvalidValue).filter(|value| !value.is_empty());

    match (err.kind(), invalid_value) {
        (ErrorKind::InvalidValue, Some(value)) => {
            let allowed = match err.get(ContextKind::ValidValue) {
                Some(ContextValue::Strings(values)) => values.clone(),
                _ => vec![],
            };
            EnumError {
                flag: context(ContextKind::InvalidArg).unwrap_or_default(),
                value,
                allowed,
            }
            .into()
        }
        (ErrorKind::UnknownArgument, _) => {
            FormatError::UnknownFlag(context(ContextKind::InvalidArg).unwrap_or_default()).into()
        }
        _ => FormatError::Usage(first_line(&err.render().to_string())).into(),
    }
}

/// `error: unexpected argument ...` → `unexpected argument ...`
fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

/// Resource-relative path of a link
///
/// Accepts absolute URLs (`https://localhost:3300/network/1`) and absolute paths (`/network/1`).
fn link_path(link: &str) -> Result<String, FormatError> {
    let url = match url::Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) if link.starts_with('/') => {
            url::Url::parse("http://localhost/").and_then(|base| base.join(link))
        }
        parsed => parsed,
    };

    match url {
        Ok(url) if url.path().starts_with('/') => Ok(url.path().to_string()),
        _ => Err(FormatError::Link(link.to_string())),
    }
}

fn readable_directory(flag: &'static str, path: PathBuf) -> Result<PathBuf, FileAccessError> {
    if !metadata(flag, &path)?.is_dir() {
        return Err(FileAccessError::new(flag, path, FileProblem::NotADirectory));
    }

    if let Err(err) = std::fs::read_dir(&path) {
        return Err(FileAccessError::new(flag, path, FileProblem::Unreadable(err)));
    }

    Ok(path)
}

fn readable_file(flag: &'static str, path: PathBuf) -> Result<PathBuf, FileAccessError> {
    if !metadata(flag, &path)?.is_file() {
        return Err(FileAccessError::new(flag, path, FileProblem::NotAFile));
    }

    if let Err(err) = std::fs::File::open(&path) {
        return Err(FileAccessError::new(flag, path, FileProblem::Unreadable(err)));
    }

    Ok(path)
}

fn metadata(flag: &'static str, path: &Path) -> Result<std::fs::Metadata, FileAccessError> {
    std::fs::metadata(path).map_err(|err| {
        let problem = match err.kind() {
            std::io::ErrorKind::NotFound => FileProblem::NotFound,
            _ => FileProblem::Unreadable(err),
        };
        FileAccessError::new(flag, path, problem)
    })
}
