// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element types and the element tree the manager styles.

use core::hash::Hash;

use crate::dictionary::StyleDictionary;

/// A stable, registration-time description of an element type.
///
/// Every element reports its type. The type's style key is used to look up
/// implicit styles: it is the explicit default style key when the type
/// overrides one (a derived control reusing its base control's template, for
/// example), and the type's fully qualified name otherwise.
///
/// # Example
///
/// ```rust
/// use understory_implicit_style::ElementType;
///
/// const BUTTON: ElementType = ElementType::new("app.Button");
/// const TOGGLE: ElementType =
///     ElementType::new("app.ToggleButton").with_default_style_key("app.Button");
///
/// assert_eq!(BUTTON.style_key(), "app.Button");
/// assert_eq!(TOGGLE.style_key(), "app.Button");
/// assert_eq!(TOGGLE.name(), "app.ToggleButton");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementType {
    name: &'static str,
    default_style_key: Option<&'static str>,
}

impl ElementType {
    /// Creates an element type identified by its fully qualified name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default_style_key: None,
        }
    }

    /// Overrides the key this type's implicit style is looked up under.
    #[must_use]
    pub const fn with_default_style_key(mut self, key: &'static str) -> Self {
        self.default_style_key = Some(key);
        self
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the explicit default style key, if the type overrides it.
    #[must_use]
    pub const fn default_style_key(&self) -> Option<&'static str> {
        self.default_style_key
    }

    /// Returns the key implicit styles are looked up under.
    #[must_use]
    pub const fn style_key(&self) -> &'static str {
        match self.default_style_key {
            Some(key) => key,
            None => self.name,
        }
    }
}

/// The element tree implicit styles are propagated over.
///
/// The host toolkit owns its elements; the manager only reads structure and
/// resources and writes resolved styles back through this trait. Keys are
/// small copyable handles (node ids, slot indices).
///
/// `children` yields the logical children used for propagation, in order.
/// `visual_child_count` is only consulted for `OneTime` elements, to decide
/// whether an element counts as styled after a pass.
pub trait StyledTree<S> {
    /// Handle identifying an element.
    type Key: Copy + Eq + Hash + core::fmt::Debug;

    /// Returns the parent of `element`, or `None` for a root.
    fn parent(&self, element: Self::Key) -> Option<Self::Key>;

    /// Returns the logical children of `element`, in order.
    fn children(&self, element: Self::Key) -> impl Iterator<Item = Self::Key> + '_;

    /// Returns the number of visual children of `element`.
    fn visual_child_count(&self, element: Self::Key) -> usize;

    /// Returns the type of `element`.
    fn element_type(&self, element: Self::Key) -> ElementType;

    /// Returns the inline resource dictionary of `element`, if it has one.
    fn local_resources(&self, element: Self::Key) -> Option<&StyleDictionary<S>>;

    /// Returns the style currently set on `element`.
    fn style(&self, element: Self::Key) -> Option<&S>;

    /// Sets the style of `element`.
    fn set_style(&mut self, element: Self::Key, style: S);
}
