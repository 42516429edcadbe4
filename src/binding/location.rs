//! Physical storage locations
//!
//! A `Location` is a parsed URI: `scheme://authority/path`, or the
//! authority-less `scheme:/path` form. Bare paths are qualified against a
//! default filesystem, the way job configurations treat them.

use crate::error::ResolutionError;
use serde::{Serialize, Serializer};

/// A fully-qualified storage location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    scheme: String,
    authority: Option<String>,
    path: String,
}

impl Location {
    /// Parse a location that must carry its own scheme.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolutionError::malformed(raw, "empty location"));
        }

        match split_scheme(trimmed) {
            Some((scheme, rest)) => {
                validate_scheme(raw, scheme)?;
                Self::from_parts(raw, scheme, rest)
            }
            None => Err(ResolutionError::malformed(raw, "missing scheme")),
        }
    }

    /// Parse a location, qualifying a bare path against `default_fs`.
    pub fn resolve(raw: &str, default_fs: &Location) -> Result<Self, ResolutionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolutionError::malformed(raw, "empty location"));
        }
        if split_scheme(trimmed).is_some() {
            return Self::parse(trimmed);
        }

        let path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/{}", default_fs.path.trim_end_matches('/'), trimmed)
        };
        Ok(Self {
            scheme: default_fs.scheme.clone(),
            authority: default_fs.authority.clone(),
            path,
        })
    }

    fn from_parts(raw: &str, scheme: &str, rest: &str) -> Result<Self, ResolutionError> {
        let (authority, path) = match rest.strip_prefix("//") {
            Some(hierarchical) => match hierarchical.find('/') {
                Some(idx) => (&hierarchical[..idx], &hierarchical[idx..]),
                None => (hierarchical, ""),
            },
            None => ("", rest),
        };

        if !path.is_empty() && !path.starts_with('/') {
            return Err(ResolutionError::malformed(raw, "path must be absolute"));
        }
        if authority.chars().any(char::is_whitespace) {
            return Err(ResolutionError::malformed(raw, "whitespace in authority"));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority: (!authority.is_empty()).then(|| authority.to_string()),
            path: path.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}{}",
            self.scheme,
            self.authority.as_deref().unwrap_or(""),
            self.path
        )
    }
}

impl std::str::FromStr for Location {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split `scheme:rest`, treating a colon after the first `/` as part of the path.
///
/// The scheme may itself contain colons (`jdbc:postgresql://...`), so the
/// split point is the `://` marker when present.
fn split_scheme(s: &str) -> Option<(&str, &str)> {
    if let Some(idx) = s.find("://") {
        if !s[..idx].contains('/') {
            return Some((&s[..idx], &s[idx + 1..]));
        }
    }
    let colon = s.find(':')?;
    if colon == 0 || s[..colon].contains('/') {
        return None;
    }
    Some((&s[..colon], &s[colon + 1..]))
}

fn validate_scheme(raw: &str, scheme: &str) -> Result<(), ResolutionError> {
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(ResolutionError::malformed(raw, "invalid scheme"))
    }
}
