// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Implicit Style: type-keyed style propagation over an element tree.
//!
//! An implicit style is a style looked up by an element's *style key* (its
//! type name, or an explicit default style key) in the resource dictionaries
//! in effect at the element, rather than assigned to the element directly.
//!
//! ## Core Concepts
//!
//! ### Dictionaries and chains
//!
//! [`StyleDictionary`] is an immutable, shared mapping from style keys to
//! style values. [`MergedStyleDictionary`] chains dictionaries nearest-first:
//! the chain in effect at an element is the application dictionary, then the
//! dictionary of each ancestor from the root down, then the element's own.
//! Lookup returns the nearest definition.
//!
//! ### The element tree
//!
//! The host toolkit owns its elements and exposes them through
//! [`StyledTree`]: parent and children, each element's [`ElementType`], its
//! inline resources and its style slot.
//!
//! ### Propagation
//!
//! [`ImplicitStyleManager::propagate_styles`] walks a subtree and assigns
//! each element the style found under its key. Styles set by anyone other
//! than the manager are never overwritten. Each element's [`ApplyMode`]
//! controls layout-driven propagation:
//!
//! - [`ApplyMode::None`]: only explicit [`ImplicitStyleManager::apply`] calls.
//! - [`ApplyMode::OneTime`]: the first layout pass styles the subtree, later
//!   passes skip it.
//! - [`ApplyMode::Auto`]: every layout pass.
//!
//! ### External dictionaries
//!
//! Elements and the application can load dictionaries from URIs through a
//! [`ResourceLocator`] and a [`DictionaryParser`]. A loaded dictionary
//! replaces the element's inline resources in the chain.
//!
//! ## Example
//!
//! ```rust
//! use understory_implicit_style::{
//!     ApplyMode, ElementType, ImplicitStyleManager, StyleDictionary, StyleDictionaryBuilder,
//!     StyleManagerConfig, StyledTree,
//! };
//!
//! const PANEL: ElementType = ElementType::new("app.Panel");
//! const BUTTON: ElementType = ElementType::new("app.Button");
//!
//! struct Element {
//!     parent: Option<usize>,
//!     children: Vec<usize>,
//!     ty: ElementType,
//!     resources: Option<StyleDictionary<&'static str>>,
//!     style: Option<&'static str>,
//! }
//!
//! struct Tree(Vec<Element>);
//!
//! impl StyledTree<&'static str> for Tree {
//!     type Key = usize;
//!     fn parent(&self, e: usize) -> Option<usize> { self.0[e].parent }
//!     fn children(&self, e: usize) -> impl Iterator<Item = usize> + '_ {
//!         self.0[e].children.iter().copied()
//!     }
//!     fn visual_child_count(&self, e: usize) -> usize { self.0[e].children.len() }
//!     fn element_type(&self, e: usize) -> ElementType { self.0[e].ty }
//!     fn local_resources(&self, e: usize) -> Option<&StyleDictionary<&'static str>> {
//!         self.0[e].resources.as_ref()
//!     }
//!     fn style(&self, e: usize) -> Option<&&'static str> { self.0[e].style.as_ref() }
//!     fn set_style(&mut self, e: usize, style: &'static str) { self.0[e].style = Some(style); }
//! }
//!
//! let panel_resources = StyleDictionaryBuilder::new().set("app.Button", "panel button").build();
//! let mut tree = Tree(vec![
//!     Element { parent: None, children: vec![1, 2], ty: PANEL, resources: Some(panel_resources), style: None },
//!     Element { parent: Some(0), children: vec![], ty: BUTTON, resources: None, style: None },
//!     Element { parent: Some(0), children: vec![], ty: BUTTON, resources: None, style: Some("custom") },
//! ]);
//!
//! let application = StyleDictionaryBuilder::new().set("app.Button", "plain button").build();
//! let mut manager = ImplicitStyleManager::new(application, StyleManagerConfig::default());
//!
//! assert!(manager.set_apply_mode(0, ApplyMode::Auto));
//! manager.on_layout_updated(&mut tree, 0);
//!
//! // The nearest dictionary wins.
//! assert_eq!(tree.0[1].style, Some("panel button"));
//! // Styles set by someone else are left alone.
//! assert_eq!(tree.0[2].style, Some("custom"));
//! ```
//!
//! ## Diagnostics
//!
//! With the `tracing` feature enabled, propagation passes and dictionary
//! load failures are reported through `tracing`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod dictionary;
mod element;
mod log;
mod manager;
mod merged;
mod resource;
mod state;

pub use dictionary::{StyleDictionary, StyleDictionaryBuilder};
pub use element::{ElementType, StyledTree};
pub use manager::{ImplicitStyleManager, PropagationStats, StyleManagerConfig};
pub use merged::MergedStyleDictionary;
pub use resource::{
    DictionaryParser, KeyValueError, KeyValueErrorKind, KeyValueParser, ResourceError,
    ResourceLocator, ResourceMap, ResourceUri, load_dictionary,
};
pub use state::{ApplyMode, ElementStyleState, StyleStateTable};
