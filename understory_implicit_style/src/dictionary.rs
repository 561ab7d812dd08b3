// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style dictionaries keyed by style key.
//!
//! This module provides [`StyleDictionary`], an immutable, shared mapping from
//! style keys to style values, and its [`StyleDictionaryBuilder`].

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

/// An ordered, immutable mapping from style keys to style values.
///
/// Style values are opaque to this crate: anything `Clone` works, and the
/// propagation pass additionally needs `PartialEq` to tell styles it assigned
/// itself apart from user overrides.
///
/// Dictionaries are immutable after creation. Use [`StyleDictionaryBuilder`]
/// to construct them.
///
/// # Memory Layout
///
/// Internally, `StyleDictionary` wraps an `Rc`, so cloning only bumps a
/// reference count. Entries are kept sorted by key for O(log n) lookup, and
/// iteration yields them in key order.
///
/// # Example
///
/// ```rust
/// use understory_implicit_style::StyleDictionaryBuilder;
///
/// let dictionary = StyleDictionaryBuilder::new()
///     .set("app.Button", "blue button")
///     .set("app.TextBlock", "serif text")
///     .build();
///
/// assert_eq!(dictionary.get("app.Button"), Some(&"blue button"));
/// assert_eq!(dictionary.get("app.Slider"), None);
/// ```
#[derive(Debug)]
pub struct StyleDictionary<S> {
    inner: Rc<DictionaryData<S>>,
}

/// Internal storage for dictionary entries.
#[derive(Debug)]
struct DictionaryData<S> {
    /// Sorted by key for binary search lookup.
    entries: Vec<(String, S)>,
}

impl<S> Clone for StyleDictionary<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> Default for StyleDictionary<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> StyleDictionary<S> {
    /// Creates a dictionary with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(DictionaryData {
                entries: Vec::new(),
            }),
        }
    }

    /// Returns `true` if this dictionary has no entries.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns the number of entries in this dictionary.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Gets the style stored under `key`, if present.
    #[must_use]
    #[inline]
    pub fn get(&self, key: &str) -> Option<&S> {
        self.inner
            .entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.inner.entries[idx].1)
    }

    /// Returns `true` if this dictionary has an entry for `key`.
    #[must_use]
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns an iterator over the keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns an iterator over `(key, style)` pairs, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &S)> + '_ {
        self.inner.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Returns `true` if both handles share the same storage.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Builder for constructing [`StyleDictionary`] instances.
///
/// # Example
///
/// ```rust
/// use understory_implicit_style::StyleDictionaryBuilder;
///
/// let dictionary = StyleDictionaryBuilder::new()
///     .set("app.Button", 1_u32)
///     .set("app.Button", 2_u32)
///     .build();
///
/// assert_eq!(dictionary.len(), 1);
/// assert_eq!(dictionary.get("app.Button"), Some(&2));
/// ```
#[derive(Debug)]
pub struct StyleDictionaryBuilder<S> {
    entries: Vec<(String, S)>,
}

impl<S> Default for StyleDictionaryBuilder<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> StyleDictionaryBuilder<S> {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the style for `key`.
    ///
    /// If the key was already set, the style is replaced.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, style: S) -> Self {
        self.insert(key, style);
        self
    }

    /// Sets the style for `key` in place.
    ///
    /// Returns the previous style for the key, if any.
    pub fn insert(&mut self, key: impl Into<String>, style: S) -> Option<S> {
        let key = key.into();
        match self
            .entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key.as_str()))
        {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, style)),
            Err(idx) => {
                self.entries.insert(idx, (key, style));
                None
            }
        }
    }

    /// Returns the number of entries set so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the dictionary.
    #[must_use]
    pub fn build(self) -> StyleDictionary<S> {
        StyleDictionary {
            inner: Rc::new(DictionaryData {
                entries: self.entries,
            }),
        }
    }
}

impl<K: Into<String>, S> FromIterator<(K, S)> for StyleDictionary<S> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut builder = StyleDictionaryBuilder::new();
        for (key, style) in iter {
            builder.insert(key, style);
        }
        builder.build()
    }
}
