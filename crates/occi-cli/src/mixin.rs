//! mixin references (`SCHEME#TERM`)
use std::sync::LazyLock;

static MIXIN_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(https?://\S+?)#(\S+)$").expect("mixin pattern must compile")
});

/// Category reference identified by scheme and term
///
/// The scheme keeps its trailing `#`, so `scheme + term` is the full category identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Mixin {
    scheme: String,
    term: String,
}

impl Mixin {
    /// Wraps an already known category
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            term: term.into(),
        }
    }

    /// Parses `http://schemas.example.org/os_tpl#debian6`
    pub fn parse(token: &str) -> Result<Self, ParseMixinError> {
        let captures = MIXIN_PATTERN
            .captures(token)
            .ok_or_else(|| ParseMixinError(token.to_string()))?;

        Ok(Self::new(format!("{}#", &captures[1]), &captures[2]))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

impl std::str::FromStr for Mixin {
    type Err = ParseMixinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Mixin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.scheme, self.term)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown mixin format {0:?}, use SCHEME#NAME")]
pub struct ParseMixinError(pub String);

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scheme_keeps_separator() {
        let mixin = Mixin::parse("http://x/y#z").unwrap();
        assert_eq!(mixin, Mixin::new("http://x/y#", "z"));
        assert_eq!(mixin.to_string(), "http://x/y#z");
    }

    #[test]
    fn https_scheme() {
        let mixin: Mixin = "https://localhost/occi/infrastructure/os_tpl#debian6"
            .parse()
            .unwrap();
        assert_eq!(mixin.scheme(), "https://localhost/occi/infrastructure/os_tpl#");
        assert_eq!(mixin.term(), "debian6");
    }

    #[test]
    fn same_token_same_mixin() {
        let token = "http://localhost/resource_tpl#small";
        assert_eq!(Mixin::parse(token), Mixin::parse(token));
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in [
            "http://localhost/os_tpl",
            "os_tpl#debian6",
            "ftp://localhost/os_tpl#debian6",
            "http://localhost/os_tpl#",
            "http://local host/os_tpl#debian6",
            "",
        ] {
            assert_eq!(
                Mixin::parse(token),
                Err(ParseMixinError(token.to_string())),
                "{token:?} must not parse"
            );
        }
    }
}
