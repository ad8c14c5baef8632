//! `KEY=VALUE` assignments
//!
//! Shared by `--attribute` and `--context`. The first `=` splits, so values may contain `=` themselves.

/// Splits `key=value`; both sides must be non-empty
pub fn split_assignment(token: &str) -> Option<(&str, &str)> {
    match token.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Some((key, value)),
        _ => None,
    }
}

/// A single resource attribute assignment
#[derive(Debug, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Attribute<'a> {
    pub fn parse(token: &'a str) -> Result<Self, ParseAttributeError> {
        let (key, value) =
            split_assignment(token).ok_or_else(|| ParseAttributeError(token.to_string()))?;
        Ok(Self { key, value })
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("attribute must always contain ATTR=VALUE pairs, got {0:?}")]
pub struct ParseAttributeError(pub String);

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_equals_sign_splits() {
        assert_eq!(
            Attribute::parse("occi.core.summary=a=b").unwrap(),
            Attribute {
                key: "occi.core.summary",
                value: "a=b"
            }
        );
    }

    #[test]
    fn value_keeps_whitespace() {
        let attribute = Attribute::parse("title=My rOCCI VM").unwrap();
        assert_eq!(attribute.value, "My rOCCI VM");
    }

    #[test]
    fn rejects_tokens_without_assignment() {
        for token in ["title", "=MyVM", "title=", "="] {
            assert_eq!(
                Attribute::parse(token),
                Err(ParseAttributeError(token.to_string()))
            );
        }
    }
}
