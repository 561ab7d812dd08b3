// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading style dictionaries from URI-addressed resources.
//!
//! Loading is a pass-through: a [`ResourceLocator`] resolves the URI to text
//! and a [`DictionaryParser`] turns the text into a [`StyleDictionary`].
//! A missing resource and a resource that fails to parse are distinct,
//! terminal failures ([`ResourceError::NotFound`] and
//! [`ResourceError::Invalid`]).

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use core::fmt;

use hashbrown::HashMap;

use crate::dictionary::{StyleDictionary, StyleDictionaryBuilder};
use crate::log;

/// Identifies a resource dictionary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUri(String);

impl ResourceUri {
    /// Creates a URI from its textual form.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Returns the textual form of the URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl From<String> for ResourceUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

/// Resolves resource URIs to their text.
pub trait ResourceLocator {
    /// Returns the text of the resource at `uri`, or `None` if there is no
    /// such resource.
    fn resource_text(&self, uri: &ResourceUri) -> Option<Cow<'_, str>>;
}

/// Parses resource text into a style dictionary.
pub trait DictionaryParser<S> {
    /// The error produced for malformed text.
    type Error: fmt::Debug + fmt::Display;

    /// Parses `text` into a dictionary.
    fn parse(&self, text: &str) -> Result<StyleDictionary<S>, Self::Error>;
}

/// Error returned when a resource dictionary cannot be loaded.
#[derive(Clone, PartialEq, Eq)]
pub enum ResourceError<E> {
    /// No resource exists at the URI.
    NotFound {
        /// The URI that failed to resolve.
        uri: ResourceUri,
    },
    /// The resource exists but is not a valid style dictionary.
    Invalid {
        /// The URI of the malformed resource.
        uri: ResourceUri,
        /// The parser's error.
        source: E,
    },
}

impl<E> ResourceError<E> {
    /// Returns the URI the failure relates to.
    #[must_use]
    pub fn uri(&self) -> &ResourceUri {
        match self {
            Self::NotFound { uri } | Self::Invalid { uri, .. } => uri,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for ResourceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { uri } => write!(f, "ResourceError::NotFound {{ uri: {uri:?} }}"),
            Self::Invalid { uri, source } => write!(
                f,
                "ResourceError::Invalid {{ uri: {uri:?}, source: {source:?} }}"
            ),
        }
    }
}

impl<E: fmt::Display> fmt::Display for ResourceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { uri } => write!(f, "resource dictionary `{uri}` was not found"),
            Self::Invalid { uri, source } => {
                write!(f, "unable to load resource dictionary `{uri}`: {source}")
            }
        }
    }
}

impl<E> core::error::Error for ResourceError<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Invalid { source, .. } => Some(source),
        }
    }
}

/// Resolves `uri` through `locator` and parses it with `parser`.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] when `locator` has no resource at
/// `uri`, and [`ResourceError::Invalid`] wrapping the parse error when the
/// text is malformed.
pub fn load_dictionary<S, L, P>(
    locator: &L,
    parser: &P,
    uri: &ResourceUri,
) -> Result<StyleDictionary<S>, ResourceError<P::Error>>
where
    L: ResourceLocator + ?Sized,
    P: DictionaryParser<S> + ?Sized,
{
    let Some(text) = locator.resource_text(uri) else {
        log::warn!(uri = uri.as_str(), "resource dictionary not found");
        return Err(ResourceError::NotFound { uri: uri.clone() });
    };
    parser.parse(&text).map_err(|source| {
        log::warn!(uri = uri.as_str(), error = %source, "invalid resource dictionary");
        ResourceError::Invalid {
            uri: uri.clone(),
            source,
        }
    })
}

/// An in-memory [`ResourceLocator`].
///
/// # Example
///
/// ```rust
/// use understory_implicit_style::{ResourceLocator, ResourceMap, ResourceUri};
///
/// let mut resources = ResourceMap::new();
/// resources.insert("/themes/dark.styles", "app.Button = dark");
///
/// let text = resources.resource_text(&ResourceUri::new("/themes/dark.styles"));
/// assert_eq!(text.as_deref(), Some("app.Button = dark"));
/// assert!(resources.resource_text(&ResourceUri::new("/missing")).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResourceMap {
    resources: HashMap<ResourceUri, String>,
}

impl ResourceMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` under `uri`, replacing any previous resource.
    pub fn insert(&mut self, uri: impl Into<ResourceUri>, text: impl Into<String>) {
        self.resources.insert(uri.into(), text.into());
    }

    /// Removes the resource at `uri`.
    pub fn remove(&mut self, uri: &ResourceUri) -> Option<String> {
        self.resources.remove(uri)
    }
}

impl ResourceLocator for ResourceMap {
    fn resource_text(&self, uri: &ResourceUri) -> Option<Cow<'_, str>> {
        self.resources.get(uri).map(|text| Cow::Borrowed(text.as_str()))
    }
}

/// Line-oriented parser producing string styles.
///
/// Each non-blank line is `key = value`. Lines starting with `#` are
/// comments. Keys and values are trimmed; a later line for the same key
/// replaces an earlier one.
///
/// ```rust
/// use understory_implicit_style::{DictionaryParser, KeyValueParser};
///
/// let dictionary = KeyValueParser
///     .parse("# button styles\napp.Button = rounded blue\n\napp.TextBlock = serif")
///     .unwrap();
/// assert_eq!(dictionary.get("app.Button").map(String::as_str), Some("rounded blue"));
///
/// let error = KeyValueParser.parse("app.Button rounded").unwrap_err();
/// assert_eq!(error.line, 1);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct KeyValueParser;

/// Error returned by [`KeyValueParser`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValueError {
    /// 1-based line number of the offending line.
    pub line: usize,
    /// What was wrong with it.
    pub kind: KeyValueErrorKind,
}

/// The kinds of malformed [`KeyValueParser`] input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyValueErrorKind {
    /// The line has no `=` separator.
    MissingSeparator,
    /// The key before `=` is empty.
    EmptyKey,
}

impl fmt::Display for KeyValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            KeyValueErrorKind::MissingSeparator => {
                write!(f, "line {}: expected `key = value`", self.line)
            }
            KeyValueErrorKind::EmptyKey => write!(f, "line {}: empty style key", self.line),
        }
    }
}

impl core::error::Error for KeyValueError {}

impl DictionaryParser<String> for KeyValueParser {
    type Error = KeyValueError;

    fn parse(&self, text: &str) -> Result<StyleDictionary<String>, Self::Error> {
        let mut builder = StyleDictionaryBuilder::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(KeyValueError {
                    line: idx + 1,
                    kind: KeyValueErrorKind::MissingSeparator,
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(KeyValueError {
                    line: idx + 1,
                    kind: KeyValueErrorKind::EmptyKey,
                });
            }
            builder.insert(key, value.trim().to_string());
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> ResourceUri {
        ResourceUri::new(s)
    }

    #[test]
    fn load_missing_resource_is_not_found() {
        let resources = ResourceMap::new();
        let err = load_dictionary(&resources, &KeyValueParser, &uri("/nope")).unwrap_err();
        assert_eq!(err, ResourceError::NotFound { uri: uri("/nope") });
        assert_eq!(err.uri(), &uri("/nope"));
    }

    #[test]
    fn load_malformed_resource_is_invalid() {
        let mut resources = ResourceMap::new();
        resources.insert("/bad", "ok = fine\nbroken line");

        let err = load_dictionary(&resources, &KeyValueParser, &uri("/bad")).unwrap_err();
        assert_eq!(
            err,
            ResourceError::Invalid {
                uri: uri("/bad"),
                source: KeyValueError {
                    line: 2,
                    kind: KeyValueErrorKind::MissingSeparator,
                },
            }
        );
    }

    #[test]
    fn invalid_exposes_parse_error_as_source() {
        use core::error::Error;

        let err: ResourceError<KeyValueError> = ResourceError::Invalid {
            uri: uri("/bad"),
            source: KeyValueError {
                line: 3,
                kind: KeyValueErrorKind::EmptyKey,
            },
        };
        let source = err.source().expect("invalid resources carry a source");
        assert_eq!(alloc::format!("{source}"), "line 3: empty style key");

        let not_found: ResourceError<KeyValueError> = ResourceError::NotFound { uri: uri("/x") };
        assert!(not_found.source().is_none());
    }

    #[test]
    fn load_valid_resource() {
        let mut resources = ResourceMap::new();
        resources.insert("/theme", "a = 1\n# comment\n\n b =  two words ");

        let dictionary = load_dictionary(&resources, &KeyValueParser, &uri("/theme")).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get("a").map(String::as_str), Some("1"));
        assert_eq!(dictionary.get("b").map(String::as_str), Some("two words"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = KeyValueParser.parse(" = value").unwrap_err();
        assert_eq!(err.kind, KeyValueErrorKind::EmptyKey);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn display_messages() {
        let not_found: ResourceError<KeyValueError> = ResourceError::NotFound { uri: uri("/x") };
        assert_eq!(
            alloc::format!("{not_found}"),
            "resource dictionary `/x` was not found"
        );
    }
}
