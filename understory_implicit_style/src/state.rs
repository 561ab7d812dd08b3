// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element implicit style state, kept in a side table.

use core::hash::Hash;

use hashbrown::HashMap;

use crate::dictionary::StyleDictionary;
use crate::resource::ResourceUri;

/// How implicit styles are applied beneath an element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApplyMode {
    /// Styles are only applied by explicit [`apply`] calls.
    ///
    /// [`apply`]: crate::ImplicitStyleManager::apply
    #[default]
    None,
    /// Styles are applied on the first layout pass; afterwards the subtree
    /// is skipped until an explicit re-apply.
    OneTime,
    /// Styles are applied after every layout pass.
    Auto,
}

impl ApplyMode {
    /// Returns `true` if layout passes trigger propagation in this mode.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Self::OneTime | Self::Auto)
    }
}

/// Implicit style state attached to one element.
#[derive(Debug)]
pub struct ElementStyleState<S> {
    /// The element's apply mode.
    pub apply_mode: ApplyMode,
    /// Set once a `OneTime` element has been styled.
    pub has_been_styled: bool,
    /// Dictionary loaded from [`ElementStyleState::resource_uri`], which
    /// replaces the element's inline resources in the chain.
    pub external_resources: Option<StyleDictionary<S>>,
    /// URI the external dictionary was loaded from.
    pub resource_uri: Option<ResourceUri>,
    /// The style the manager last assigned to the element.
    pub applied_style: Option<S>,
}

impl<S> Default for ElementStyleState<S> {
    fn default() -> Self {
        Self {
            apply_mode: ApplyMode::None,
            has_been_styled: false,
            external_resources: None,
            resource_uri: None,
            applied_style: None,
        }
    }
}

impl<S> ElementStyleState<S> {
    /// Returns `true` if this element's subtree is skipped by unforced passes.
    #[must_use]
    pub fn prunes_subtree(&self) -> bool {
        self.apply_mode == ApplyMode::OneTime && self.has_been_styled
    }
}

/// Side table of [`ElementStyleState`] keyed by element identity.
///
/// Entries are created the first time an element is observed and live until
/// [`StyleStateTable::forget`] is called for it.
#[derive(Debug)]
pub struct StyleStateTable<K, S> {
    states: HashMap<K, ElementStyleState<S>>,
}

impl<K, S> Default for StyleStateTable<K, S> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<K, S> StyleStateTable<K, S>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of `element`, if it has been observed.
    #[must_use]
    pub fn get(&self, element: K) -> Option<&ElementStyleState<S>> {
        self.states.get(&element)
    }

    /// Returns the state of `element` mutably, if it has been observed.
    pub fn get_mut(&mut self, element: K) -> Option<&mut ElementStyleState<S>> {
        self.states.get_mut(&element)
    }

    /// Returns the state of `element`, creating it on first observation.
    pub fn entry(&mut self, element: K) -> &mut ElementStyleState<S> {
        self.states.entry(element).or_default()
    }

    /// Returns the apply mode of `element` (`None` when unobserved).
    #[must_use]
    pub fn apply_mode(&self, element: K) -> ApplyMode {
        self.get(element).map_or(ApplyMode::None, |s| s.apply_mode)
    }

    /// Returns whether `element` has been styled by a `OneTime` pass.
    #[must_use]
    pub fn has_been_styled(&self, element: K) -> bool {
        self.get(element).is_some_and(|s| s.has_been_styled)
    }

    /// Returns the external dictionary of `element`, if one is loaded.
    #[must_use]
    pub fn external_resources(&self, element: K) -> Option<&StyleDictionary<S>> {
        self.get(element).and_then(|s| s.external_resources.as_ref())
    }

    /// Drops all state for `element`.
    pub fn forget(&mut self, element: K) -> Option<ElementStyleState<S>> {
        self.states.remove(&element)
    }

    /// Returns the number of observed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no element has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
