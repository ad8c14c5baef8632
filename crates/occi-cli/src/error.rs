//! error taxonomy of the resolver
//!
//! - [FormatError]: a token or flag that does not follow its grammar
//! - [FileAccessError]: a path that is missing, of the wrong type or unreadable
//! - [EnumError]: a value outside of a closed set
//! - [ValidationError]: a descriptor that violates a cross-field rule
//!
//! The first three abort resolution where they occur. [ValidationError] is
//! produced once, after every flag was consumed.
use std::path::PathBuf;

/// Any failure that ends a resolution run
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),
    #[error(transparent)]
    Enum(#[from] EnumError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<crate::context::ContextError> for ResolveError {
    fn from(value: crate::context::ContextError) -> Self {
        use crate::context::ContextError;

        match value {
            ContextError::Malformed(token) => FormatError::Context(token).into(),
            ContextError::File(err) => err.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("unknown option {0}")]
    UnknownFlag(String),
    #[error(transparent)]
    Mixin(#[from] crate::mixin::ParseMixinError),
    #[error(transparent)]
    Attribute(#[from] crate::attribute::ParseAttributeError),
    #[error("context variables must always contain KEY=VALUE pairs, got {0:?}")]
    Context(String),
    #[error("invalid endpoint URI {value:?}")]
    Endpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("specified link URI {0:?} is not valid")]
    Link(String),
    /// Anything else the flag table rejects (missing values, stray arguments, ...)
    #[error("{0}")]
    Usage(String),
}

#[derive(thiserror::Error, Debug)]
#[error("{} specified in {flag} {}", .path.display(), .problem)]
pub struct FileAccessError {
    pub flag: &'static str,
    pub path: PathBuf,
    pub problem: FileProblem,
}

impl FileAccessError {
    pub fn new(flag: &'static str, path: impl Into<PathBuf>, problem: FileProblem) -> Self {
        Self {
            flag,
            path: path.into(),
            problem,
        }
    }
}

#[derive(Debug)]
pub enum FileProblem {
    NotFound,
    NotADirectory,
    NotAFile,
    Unreadable(std::io::Error),
}

impl std::fmt::Display for FileProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileProblem::NotFound => f.write_str("does not exist"),
            FileProblem::NotADirectory => f.write_str("is not a directory"),
            FileProblem::NotAFile => f.write_str("is not a file"),
            FileProblem::Unreadable(err) => write!(f, "is not readable ({err})"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid value {value:?} for {flag}, possible values: {}", .allowed.join(", "))]
pub struct EnumError {
    pub flag: String,
    pub value: String,
    pub allowed: Vec<String>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("you cannot use '--filter' without '--dump-model'")]
    FilterWithoutDumpModel,
    #[error("you cannot use '--voms' without '--auth x509'")]
    VomsWithoutX509,
    #[error("missing required arguments: {}", join_fields(.0))]
    MissingFields(Vec<Field>),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Descriptor fields the validator can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Resource,
    Action,
    TriggerAction,
    Links,
    Mixins,
    Attributes,
    /// `attributes.title`
    Title,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Resource => f.write_str("resource"),
            Field::Action => f.write_str("action"),
            Field::TriggerAction => f.write_str("trigger_action"),
            Field::Links => f.write_str("links"),
            Field::Mixins => f.write_str("mixins"),
            Field::Attributes => f.write_str("attributes"),
            Field::Title => f.write_str("title"),
        }
    }
}
