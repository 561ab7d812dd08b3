// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routed drag event payloads.

use alloc::rc::Rc;
use core::fmt;

use kurbo::Point;

use crate::effects::{DragDropEffects, DragDropKeyStates};

/// The drag events raised on drop targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    /// The pointer entered a new drop target.
    Enter,
    /// The pointer is over the current drop target.
    Over,
    /// The pointer left the current drop target.
    Leave,
    /// The data was dropped on the current drop target.
    Drop,
}

/// What the drag source wants to happen next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragAction {
    /// Keep dragging.
    #[default]
    Continue,
    /// Drop on the current target.
    Drop,
    /// Abandon the drag.
    Cancel,
}

/// Payload of [`DragEventKind`] events raised on drop targets.
///
/// Handlers report the effect they would perform in `effects` and set
/// `handled` to stop the event from bubbling further.
pub struct DragEventArgs<K, D> {
    /// The element the event was raised on.
    pub original_source: K,
    /// The dragged data.
    pub data: Rc<D>,
    /// Effects the drag source allows.
    pub allowed_effects: DragDropEffects,
    /// Effect reported by the target. Starts out as `allowed_effects`.
    pub effects: DragDropEffects,
    /// Button and modifier state when the event was raised.
    pub key_states: DragDropKeyStates,
    /// Pointer position in root coordinates, once the pointer has moved.
    pub position: Option<Point>,
    /// Set by a handler to mark the event handled.
    pub handled: bool,
}

impl<K: Copy, D> Clone for DragEventArgs<K, D> {
    fn clone(&self) -> Self {
        Self {
            original_source: self.original_source,
            data: Rc::clone(&self.data),
            allowed_effects: self.allowed_effects,
            effects: self.effects,
            key_states: self.key_states,
            position: self.position,
            handled: self.handled,
        }
    }
}

impl<K: fmt::Debug, D> fmt::Debug for DragEventArgs<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEventArgs")
            .field("original_source", &self.original_source)
            .field("allowed_effects", &self.allowed_effects)
            .field("effects", &self.effects)
            .field("key_states", &self.key_states)
            .field("position", &self.position)
            .field("handled", &self.handled)
            .finish_non_exhaustive()
    }
}

impl<K, D> DragEventArgs<K, D> {
    /// Returns the dragged data.
    #[must_use]
    pub fn data(&self) -> &D {
        &self.data
    }
}

/// Payload of the give-feedback event raised on the drag source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GiveFeedbackArgs<K> {
    /// The drag source.
    pub original_source: K,
    /// The effect the drop would currently have.
    pub effects: DragDropEffects,
    /// Set by a handler to mark the event handled.
    pub handled: bool,
}

/// Payload of the query-continue-drag event raised on the drag source.
///
/// A handler that wants to decide the next step sets `action` and marks the
/// event `handled`. Unhandled queries get a default answer from the
/// coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueryContinueDragArgs<K> {
    /// The drag source.
    pub original_source: K,
    /// The requested next step.
    pub action: DragAction,
    /// Whether escape is held.
    pub escape_pressed: bool,
    /// Button and modifier state.
    pub key_states: DragDropKeyStates,
    /// Set by a handler to mark the event handled.
    pub handled: bool,
}
