//! request descriptor and its builder
//!
//! [DescriptorBuilder] starts from the defaults documented on [RequestDescriptor], gets mutated by the
//! option handlers in argument order and is validated exactly once by [DescriptorBuilder::finish].
use crate::context::ContextKey;
use crate::error::ValidationError;
use crate::mixin::Mixin;
use crate::output::OutputFormat;
use indexmap::{IndexMap, IndexSet};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://localhost:3300/";
pub const DEFAULT_USERNAME: &str = "anonymous";
pub const DEFAULT_CA_PATH: &str = "/etc/grid-security/certificates";
/// relative to `$HOME`
pub const DEFAULT_USER_CRED: &str = ".globus/usercred.pem";

/// Process environment the defaults depend on
#[derive(Debug, Clone, Default, derive_new::new)]
pub struct Environment {
    pub home: Option<PathBuf>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self::new(std::env::var_os("HOME").map(PathBuf::from))
    }
}

/// Everything the transport needs to issue a single request
#[derive(Debug, Clone, serde::Serialize)]
pub struct RequestDescriptor {
    /// defaults to [DEFAULT_ENDPOINT]
    pub endpoint: url::Url,
    pub auth: Auth,
    pub log: LogConfig,
    pub debug: bool,
    pub verbose: bool,
    /// category type identifier, only together with `dump_model`
    pub filter: Option<String>,
    /// retrieve and print the remote model instead of acting on a resource
    pub dump_model: bool,
    pub output_format: OutputFormat,
    pub media_type: MediaType,
    pub resource: Option<String>,
    pub action: Option<Action>,
    pub trigger_action: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub context_vars: IndexMap<ContextKey, String>,
    pub mixins: IndexSet<Mixin>,
    /// resource-relative paths, e.g. `/network/public`
    pub links: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Auth {
    pub method: AuthMethod,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub user_cert_password: Option<String>,
    /// defaults to `$HOME/.globus/usercred.pem`
    pub user_cert: Option<PathBuf>,
    pub ca_path: PathBuf,
    pub ca_file: Option<PathBuf>,
    pub voms: bool,
}

impl Auth {
    fn new(env: &Environment) -> Self {
        Self {
            method: AuthMethod::None,
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            user_cert_password: None,
            user_cert: env.home.as_ref().map(|home| home.join(DEFAULT_USER_CRED)),
            ca_path: PathBuf::from(DEFAULT_CA_PATH),
            ca_file: None,
            voms: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LogConfig {
    pub target: LogTarget,
    pub level: LogLevel,
}

#[derive(clap::ValueEnum, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    X509,
    Basic,
    Digest,
    None,
}

#[derive(clap::ValueEnum, serde::Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum MediaType {
    #[value(name = "application/occi+json")]
    #[serde(rename = "application/occi+json")]
    OcciJson,
    #[value(name = "application/occi+xml")]
    #[serde(rename = "application/occi+xml")]
    OcciXml,
    #[default]
    #[value(name = "text/plain,text/occi")]
    #[serde(rename = "text/plain,text/occi")]
    TextPlainOcci,
    #[value(name = "text/plain")]
    #[serde(rename = "text/plain")]
    TextPlain,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::OcciJson => "application/occi+json",
            MediaType::OcciXml => "application/occi+xml",
            MediaType::TextPlainOcci => "text/plain,text/occi",
            MediaType::TextPlain => "text/plain",
        }
    }
}

#[derive(clap::ValueEnum, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Describe,
    Create,
    Delete,
    Trigger,
}

#[derive(clap::ValueEnum, serde::Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    #[default]
    Stderr,
}

#[derive(serde::Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Warn,
    Info,
    Debug,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

/// Mutable accumulator for a [RequestDescriptor]
///
/// List-valued setters add, scalar setters overwrite.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl DescriptorBuilder {
    pub fn new(env: &Environment) -> Self {
        let descriptor = RequestDescriptor {
            endpoint: url::Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            auth: Auth::new(env),
            log: LogConfig::default(),
            debug: false,
            verbose: false,
            filter: None,
            dump_model: false,
            output_format: OutputFormat::default(),
            media_type: MediaType::default(),
            resource: None,
            action: None,
            trigger_action: None,
            attributes: IndexMap::new(),
            context_vars: IndexMap::new(),
            mixins: IndexSet::new(),
            links: Vec::new(),
        };

        Self { descriptor }
    }

    pub fn endpoint(&mut self, endpoint: url::Url) -> &mut Self {
        self.descriptor.endpoint = endpoint;
        self
    }

    pub fn auth_method(&mut self, method: AuthMethod) -> &mut Self {
        self.descriptor.auth.method = method;
        self
    }

    pub fn username(&mut self, username: impl Into<String>) -> &mut Self {
        self.descriptor.auth.username = username.into();
        self
    }

    /// Used for basic/digest authentication and to unlock the x509 credentials
    pub fn password(&mut self, password: impl Into<String>) -> &mut Self {
        let password = password.into();
        self.descriptor.auth.user_cert_password = Some(password.clone());
        self.descriptor.auth.password = Some(password);
        self
    }

    pub fn ca_path(&mut self, ca_path: impl Into<PathBuf>) -> &mut Self {
        self.descriptor.auth.ca_path = ca_path.into();
        self
    }

    pub fn ca_file(&mut self, ca_file: impl Into<PathBuf>) -> &mut Self {
        self.descriptor.auth.ca_file = Some(ca_file.into());
        self
    }

    pub fn user_cert(&mut self, user_cert: impl Into<PathBuf>) -> &mut Self {
        self.descriptor.auth.user_cert = Some(user_cert.into());
        self
    }

    pub fn voms(&mut self, voms: bool) -> &mut Self {
        self.descriptor.auth.voms = voms;
        self
    }

    pub fn resource(&mut self, resource: impl Into<String>) -> &mut Self {
        self.descriptor.resource = Some(resource.into());
        self
    }

    pub fn action(&mut self, action: Action) -> &mut Self {
        self.descriptor.action = Some(action);
        self
    }

    pub fn trigger_action(&mut self, trigger_action: impl Into<String>) -> &mut Self {
        self.descriptor.trigger_action = Some(trigger_action.into());
        self
    }

    pub fn filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.descriptor.filter = Some(filter.into());
        self
    }

    pub fn media_type(&mut self, media_type: MediaType) -> &mut Self {
        self.descriptor.media_type = media_type;
        self
    }

    pub fn output_format(&mut self, output_format: OutputFormat) -> &mut Self {
        self.descriptor.output_format = output_format;
        self
    }

    pub fn log_target(&mut self, target: LogTarget) -> &mut Self {
        self.descriptor.log.target = target;
        self
    }

    pub fn dump_model(&mut self, dump_model: bool) -> &mut Self {
        self.descriptor.dump_model = dump_model;
        self
    }

    /// Raises the log level, `debug` wins over `verbose`
    pub fn verbosity(&mut self, debug: bool, verbose: bool) -> &mut Self {
        let descriptor = &mut self.descriptor;
        descriptor.debug |= debug;
        descriptor.verbose |= verbose;

        if descriptor.debug {
            descriptor.log.level = LogLevel::Debug;
        } else if descriptor.verbose {
            descriptor.log.level = LogLevel::Info;
        }
        self
    }

    pub fn insert_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let key = key.into();
        if let Some(previous) = self.descriptor.attributes.insert(key.clone(), value.into()) {
            tracing::debug!(%key, %previous, "attribute overwritten");
        }
        self
    }

    pub fn insert_context_var(&mut self, key: ContextKey, value: impl Into<String>) -> &mut Self {
        self.descriptor.context_vars.insert(key, value.into());
        self
    }

    /// Also accepts categories that were built elsewhere
    pub fn add_mixin(&mut self, mixin: Mixin) -> &mut Self {
        self.descriptor.mixins.insert(mixin);
        self
    }

    pub fn add_link(&mut self, path: impl Into<String>) -> &mut Self {
        self.descriptor.links.push(path.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Validates once and hands out the immutable descriptor
    pub fn finish(self) -> Result<RequestDescriptor, ValidationError> {
        crate::validate::validate(&self.descriptor)?;
        Ok(self.descriptor)
    }
}
