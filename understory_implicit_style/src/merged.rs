// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merged style dictionary chains.
//!
//! A [`MergedStyleDictionary`] is a singly linked chain of
//! [`StyleDictionary`] links, nearest-first. Each link points at its parent,
//! and lookup walks outward until a key is found. Links are shared, so the
//! chains of sibling elements reuse their common ancestor links.

use alloc::rc::Rc;

use crate::dictionary::StyleDictionary;

/// A nearest-first chain of style dictionaries with ancestor fallback.
///
/// Extending a chain with [`MergedStyleDictionary::push`] never copies the
/// existing links; the new chain holds a reference to the old head.
///
/// # Example
///
/// ```rust
/// use understory_implicit_style::{MergedStyleDictionary, StyleDictionaryBuilder};
///
/// let application = StyleDictionaryBuilder::new()
///     .set("app.Button", "application button")
///     .set("app.TextBlock", "application text")
///     .build();
/// let panel = StyleDictionaryBuilder::new()
///     .set("app.Button", "panel button")
///     .build();
///
/// let chain = MergedStyleDictionary::new(application).push(panel);
///
/// // The nearest definition wins.
/// assert_eq!(chain.get("app.Button"), Some(&"panel button"));
/// // Keys the panel does not define fall back to the application.
/// assert_eq!(chain.get("app.TextBlock"), Some(&"application text"));
/// assert_eq!(chain.get("app.Slider"), None);
/// ```
#[derive(Debug)]
pub struct MergedStyleDictionary<S> {
    head: Option<Rc<Link<S>>>,
}

#[derive(Debug)]
struct Link<S> {
    dictionary: StyleDictionary<S>,
    parent: Option<Rc<Link<S>>>,
}

impl<S> Clone for MergedStyleDictionary<S> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<S> Default for MergedStyleDictionary<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> MergedStyleDictionary<S> {
    /// Creates a chain with no links. Every lookup misses.
    #[must_use]
    pub const fn empty() -> Self {
        Self { head: None }
    }

    /// Creates a single-link chain rooted at `dictionary`.
    #[must_use]
    pub fn new(dictionary: StyleDictionary<S>) -> Self {
        Self::empty().push(dictionary)
    }

    /// Returns a new chain whose nearest link is `dictionary` and whose
    /// parent is this chain.
    #[must_use]
    pub fn push(&self, dictionary: StyleDictionary<S>) -> Self {
        Self {
            head: Some(Rc::new(Link {
                dictionary,
                parent: self.head.clone(),
            })),
        }
    }

    /// Returns the chain without its nearest link.
    ///
    /// The parent of a single-link or empty chain is the empty chain.
    #[must_use]
    pub fn parent(&self) -> Self {
        Self {
            head: self.head.as_ref().and_then(|link| link.parent.clone()),
        }
    }

    /// Returns `true` if the chain has no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of links in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.dictionaries().count()
    }

    /// Looks `key` up nearest-first, returning the first match.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&S> {
        self.dictionaries().find_map(|dictionary| dictionary.get(key))
    }

    /// Returns `true` if any link defines `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates the linked dictionaries nearest-first.
    pub fn dictionaries(&self) -> impl Iterator<Item = &StyleDictionary<S>> + '_ {
        let mut link = self.head.as_deref();
        core::iter::from_fn(move || {
            let current = link?;
            link = current.parent.as_deref();
            Some(&current.dictionary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StyleDictionaryBuilder;

    #[test]
    fn empty_chain_misses() {
        let chain = MergedStyleDictionary::<u32>::empty();
        assert!(chain.is_empty());
        assert_eq!(chain.depth(), 0);
        assert_eq!(chain.get("T"), None);
        assert!(chain.parent().is_empty());
    }

    #[test]
    fn nearest_definition_wins() {
        let root = StyleDictionaryBuilder::new().set("T", 'A').build();
        let child = StyleDictionaryBuilder::new().set("T", 'B').build();

        let chain = MergedStyleDictionary::new(root).push(child);
        assert_eq!(chain.get("T"), Some(&'B'));
        assert_eq!(chain.parent().get("T"), Some(&'A'));
    }

    #[test]
    fn lookup_falls_through_empty_links() {
        let root = StyleDictionaryBuilder::new().set("T", 1_u32).build();
        let chain = MergedStyleDictionary::new(root)
            .push(StyleDictionary::empty())
            .push(StyleDictionary::empty());

        assert_eq!(chain.depth(), 3);
        assert_eq!(chain.get("T"), Some(&1));
    }

    #[test]
    fn siblings_share_ancestor_links() {
        let root = StyleDictionaryBuilder::new().set("T", 1_u32).build();
        let parent = MergedStyleDictionary::new(root.clone());

        let left = parent.push(StyleDictionaryBuilder::new().set("L", 2).build());
        let right = parent.push(StyleDictionaryBuilder::new().set("R", 3).build());

        assert_eq!(left.get("R"), None);
        assert_eq!(right.get("L"), None);
        let left_root = left.dictionaries().last().unwrap();
        let right_root = right.dictionaries().last().unwrap();
        assert!(left_root.ptr_eq(&root));
        assert!(right_root.ptr_eq(&root));
    }
}
