// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The implicit style manager.

use alloc::vec::Vec;
use core::hash::Hash;

use smallvec::SmallVec;

use crate::dictionary::StyleDictionary;
use crate::element::StyledTree;
use crate::log;
use crate::merged::MergedStyleDictionary;
use crate::resource::{
    DictionaryParser, ResourceError, ResourceLocator, ResourceUri, load_dictionary,
};
use crate::state::{ApplyMode, StyleStateTable};

/// Configuration for an [`ImplicitStyleManager`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StyleManagerConfig {
    /// Whether merged dictionary chains are rooted at the application
    /// dictionary. When `false`, chains start at the top-most ancestor.
    pub use_application_resources: bool,
}

impl Default for StyleManagerConfig {
    fn default() -> Self {
        Self {
            use_application_resources: true,
        }
    }
}

impl StyleManagerConfig {
    /// Sets [`StyleManagerConfig::use_application_resources`].
    #[must_use]
    pub const fn with_use_application_resources(mut self, enabled: bool) -> Self {
        self.use_application_resources = enabled;
        self
    }
}

/// Counters reported by a propagation pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Elements visited.
    pub visited: usize,
    /// Elements that were assigned an implicit style.
    pub styled: usize,
}

/// Applies implicit, type-keyed styles to the elements of a [`StyledTree`].
///
/// The manager owns the per-element style state (apply modes, external
/// dictionaries and the styles it assigned) and the application dictionary.
/// The tree itself is borrowed for each operation.
///
/// A style found for an element is only assigned when the element has no
/// style yet, or still has the style this manager assigned previously.
/// Styles set by anyone else are left alone.
#[derive(Debug)]
pub struct ImplicitStyleManager<K, S> {
    config: StyleManagerConfig,
    application_resources: StyleDictionary<S>,
    external_application: Option<(ResourceUri, StyleDictionary<S>)>,
    states: StyleStateTable<K, S>,
}

impl<K, S> ImplicitStyleManager<K, S>
where
    K: Copy + Eq + Hash + core::fmt::Debug,
    S: Clone + PartialEq,
{
    /// Creates a manager over the host's application dictionary.
    #[must_use]
    pub fn new(application_resources: StyleDictionary<S>, config: StyleManagerConfig) -> Self {
        Self {
            config,
            application_resources,
            external_application: None,
            states: StyleStateTable::new(),
        }
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> StyleManagerConfig {
        self.config
    }

    /// Enables or disables rooting chains at the application dictionary.
    pub fn set_use_application_resources(&mut self, enabled: bool) {
        self.config.use_application_resources = enabled;
    }

    /// Replaces the host-provided application dictionary.
    ///
    /// A dictionary loaded through
    /// [`set_application_resource_dictionary_uri`](Self::set_application_resource_dictionary_uri)
    /// still takes precedence.
    pub fn set_application_resources(&mut self, resources: StyleDictionary<S>) {
        self.application_resources = resources;
    }

    /// Returns the dictionary chains are rooted at when application
    /// resources are in use.
    #[must_use]
    pub fn application_dictionary(&self) -> &StyleDictionary<S> {
        match &self.external_application {
            Some((_, dictionary)) => dictionary,
            None => &self.application_resources,
        }
    }

    /// Returns the URI of the loaded application dictionary, if any.
    #[must_use]
    pub fn application_resource_dictionary_uri(&self) -> Option<&ResourceUri> {
        self.external_application.as_ref().map(|(uri, _)| uri)
    }

    /// Returns the per-element state table.
    #[must_use]
    pub fn states(&self) -> &StyleStateTable<K, S> {
        &self.states
    }

    /// Drops all state for `element`.
    ///
    /// Hosts call this when an element is destroyed.
    pub fn forget(&mut self, element: K) {
        self.states.forget(element);
    }

    /// Returns the apply mode of `element`.
    #[must_use]
    pub fn apply_mode(&self, element: K) -> ApplyMode {
        self.states.apply_mode(element)
    }

    /// Sets the apply mode of `element`.
    ///
    /// Any change resets the element's styled flag. Returns `true` if the
    /// element is now attached to layout-driven propagation (see
    /// [`on_layout_updated`](Self::on_layout_updated)).
    pub fn set_apply_mode(&mut self, element: K, mode: ApplyMode) -> bool {
        let state = self.states.entry(element);
        let previous = core::mem::replace(&mut state.apply_mode, mode);
        state.has_been_styled = false;
        if previous.is_automatic() != mode.is_automatic() {
            log::debug!(
                ?element,
                attached = mode.is_automatic(),
                "layout propagation attachment changed"
            );
        }
        mode.is_automatic()
    }

    /// Returns the style key `element` is looked up under.
    #[must_use]
    pub fn style_key<T>(&self, tree: &T, element: K) -> &'static str
    where
        T: StyledTree<S, Key = K>,
    {
        tree.element_type(element).style_key()
    }

    /// Returns the URI of `element`'s external dictionary, if any.
    #[must_use]
    pub fn resource_dictionary_uri(&self, element: K) -> Option<&ResourceUri> {
        self.states
            .get(element)
            .and_then(|state| state.resource_uri.as_ref())
    }

    /// Loads and attaches an external dictionary for `element`, or clears
    /// it when `uri` is `None`.
    ///
    /// The external dictionary replaces the element's inline resources in
    /// merged chains.
    ///
    /// # Errors
    ///
    /// Returns the [`ResourceError`] from loading. The element's external
    /// dictionary and URI are cleared first.
    pub fn set_resource_dictionary_uri<L, P>(
        &mut self,
        locator: &L,
        parser: &P,
        element: K,
        uri: Option<ResourceUri>,
    ) -> Result<(), ResourceError<P::Error>>
    where
        L: ResourceLocator + ?Sized,
        P: DictionaryParser<S> + ?Sized,
    {
        let Some(uri) = uri else {
            if let Some(state) = self.states.get_mut(element) {
                state.resource_uri = None;
                state.external_resources = None;
            }
            return Ok(());
        };
        let loaded = load_dictionary(locator, parser, &uri);
        let state = self.states.entry(element);
        match loaded {
            Ok(dictionary) => {
                state.external_resources = Some(dictionary);
                state.resource_uri = Some(uri);
                Ok(())
            }
            Err(err) => {
                state.external_resources = None;
                state.resource_uri = None;
                Err(err)
            }
        }
    }

    /// Loads the application dictionary from `uri`, or reverts to the
    /// host-provided dictionary when `uri` is `None`.
    ///
    /// # Errors
    ///
    /// Returns the [`ResourceError`] from loading. The previously loaded
    /// application dictionary is discarded first.
    pub fn set_application_resource_dictionary_uri<L, P>(
        &mut self,
        locator: &L,
        parser: &P,
        uri: Option<ResourceUri>,
    ) -> Result<(), ResourceError<P::Error>>
    where
        L: ResourceLocator + ?Sized,
        P: DictionaryParser<S> + ?Sized,
    {
        self.external_application = None;
        let Some(uri) = uri else {
            return Ok(());
        };
        let dictionary = load_dictionary(locator, parser, &uri)?;
        self.external_application = Some((uri, dictionary));
        Ok(())
    }

    /// Builds the merged dictionary chain in effect at `element`.
    ///
    /// Links run from the chain root down to `element`. Each element
    /// contributes its external dictionary if it has one, else its inline
    /// resources; elements with neither contribute nothing.
    #[must_use]
    pub fn merged_dictionary<T>(&self, tree: &T, element: K) -> MergedStyleDictionary<S>
    where
        T: StyledTree<S, Key = K>,
    {
        let mut path: SmallVec<[K; 16]> = SmallVec::new();
        let mut cursor = Some(element);
        while let Some(node) = cursor {
            path.push(node);
            cursor = tree.parent(node);
        }
        path.iter()
            .rev()
            .fold(self.root_chain(), |chain, &node| self.extend(tree, &chain, node))
    }

    /// Propagates implicit styles through the subtree rooted at `root`.
    ///
    /// Elements are visited depth-first in pre-order. Unless `force` is set,
    /// a `OneTime` element that has already been styled is skipped together
    /// with its subtree.
    pub fn propagate_styles<T>(&mut self, tree: &mut T, root: K, force: bool) -> PropagationStats
    where
        T: StyledTree<S, Key = K>,
    {
        let base = match tree.parent(root) {
            Some(parent) => self.merged_dictionary(&*tree, parent),
            None => self.root_chain(),
        };
        log::trace!(?root, force, "implicit style pass started");

        let mut stats = PropagationStats::default();
        let mut stack: Vec<(K, MergedStyleDictionary<S>)> = Vec::new();
        stack.push((root, base));
        while let Some((node, parent_chain)) = stack.pop() {
            if !force
                && self
                    .states
                    .get(node)
                    .is_some_and(|state| state.prunes_subtree())
            {
                log::trace!(?node, "skipping styled one-time subtree");
                continue;
            }
            stats.visited += 1;
            let chain = self.extend(&*tree, &parent_chain, node);

            let applied = self.style_element(tree, &chain, node);
            if applied {
                stats.styled += 1;
            }
            if self.states.apply_mode(node) == ApplyMode::OneTime
                && (applied || tree.visual_child_count(node) > 0)
            {
                self.states.entry(node).has_been_styled = true;
            }

            let children: SmallVec<[K; 8]> = tree.children(node).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, chain.clone())));
        }

        log::debug!(
            ?root,
            visited = stats.visited,
            styled = stats.styled,
            "implicit style pass finished"
        );
        stats
    }

    /// Re-applies implicit styles to the whole subtree rooted at `element`,
    /// ignoring one-time pruning.
    pub fn apply<T>(&mut self, tree: &mut T, element: K) -> PropagationStats
    where
        T: StyledTree<S, Key = K>,
    {
        self.propagate_styles(tree, element, true)
    }

    /// Runs layout-driven propagation for `element`.
    ///
    /// Hosts call this when a layout pass completes. Returns `None` when the
    /// element's apply mode is [`ApplyMode::None`].
    pub fn on_layout_updated<T>(&mut self, tree: &mut T, element: K) -> Option<PropagationStats>
    where
        T: StyledTree<S, Key = K>,
    {
        self.apply_mode(element)
            .is_automatic()
            .then(|| self.propagate_styles(tree, element, false))
    }

    fn root_chain(&self) -> MergedStyleDictionary<S> {
        if self.config.use_application_resources {
            MergedStyleDictionary::new(self.application_dictionary().clone())
        } else {
            MergedStyleDictionary::empty()
        }
    }

    fn extend<T>(
        &self,
        tree: &T,
        chain: &MergedStyleDictionary<S>,
        element: K,
    ) -> MergedStyleDictionary<S>
    where
        T: StyledTree<S, Key = K>,
    {
        let dictionary = self
            .states
            .external_resources(element)
            .or_else(|| tree.local_resources(element));
        match dictionary {
            Some(dictionary) => chain.push(dictionary.clone()),
            None => chain.clone(),
        }
    }

    /// Assigns the style found for `element` in `chain`, if allowed.
    fn style_element<T>(
        &mut self,
        tree: &mut T,
        chain: &MergedStyleDictionary<S>,
        element: K,
    ) -> bool
    where
        T: StyledTree<S, Key = K>,
    {
        let key = tree.element_type(element).style_key();
        let Some(style) = chain.get(key) else {
            return false;
        };
        let previously_applied = self
            .states
            .get(element)
            .and_then(|state| state.applied_style.as_ref());
        let assignable = tree
            .style(element)
            .is_none_or(|current| previously_applied == Some(current));
        if !assignable {
            log::trace!(?element, key, "keeping explicitly set style");
            return false;
        }
        tree.set_style(element, style.clone());
        self.states.entry(element).applied_style = Some(style.clone());
        true
    }
}
