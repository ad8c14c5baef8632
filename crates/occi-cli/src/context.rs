//! contextualization variables (`--context KEY=VALUE`)
//!
//! Only [ContextKey]s are accepted, anything else is skipped with a warning.
//! A value of `file://<path>` is replaced by the contents of `<path>`.
//! `user_data` ends up as single-line base64.
use crate::attribute::split_assignment;
use crate::error::{FileAccessError, FileProblem};
use base64::Engine;

const FILE_PREFIX: &str = "file://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    PublicKey,
    UserData,
}

impl ContextKey {
    pub const ALL: [ContextKey; 2] = [ContextKey::PublicKey, ContextKey::UserData];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::PublicKey => "public_key",
            ContextKey::UserData => "user_data",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ContextError {
    #[error("context variables must always contain KEY=VALUE pairs, got {0:?}")]
    Malformed(String),
    #[error(transparent)]
    File(#[from] FileAccessError),
}

/// Resolves a single `--context` token
///
/// `Ok(None)` means the key is not supported and the token was skipped.
pub fn parse(token: &str) -> Result<Option<(ContextKey, String)>, ContextError> {
    let (name, value) =
        split_assignment(token).ok_or_else(|| ContextError::Malformed(token.to_string()))?;

    let Some(key) = ContextKey::from_name(name) else {
        let supported = ContextKey::ALL.map(|key| key.as_str()).join(", ");
        tracing::warn!("Only {supported} context variables are supported! Skipping {name} ...");
        return Ok(None);
    };

    let content = match value.strip_prefix(FILE_PREFIX) {
        Some(path) => read_file(path)?,
        None => value.as_bytes().to_vec(),
    };

    let value = match key {
        ContextKey::UserData => base64::engine::general_purpose::STANDARD.encode(&content),
        ContextKey::PublicKey => String::from_utf8_lossy(&content).into_owned(),
    };

    tracing::debug!(%key, "context variable resolved");
    Ok(Some((key, value.trim().to_string())))
}

fn read_file(path: &str) -> Result<Vec<u8>, FileAccessError> {
    tracing::info!(path, "loading context variable from file");
    std::fs::read(path).map_err(|err| {
        let problem = match err.kind() {
            std::io::ErrorKind::NotFound => FileProblem::NotFound,
            _ => FileProblem::Unreadable(err),
        };
        FileAccessError::new("--context", path, problem)
    })
}
