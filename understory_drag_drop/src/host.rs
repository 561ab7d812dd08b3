// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the host toolkit and the terminal observer.

use alloc::boxed::Box;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;

use crate::effects::DragDropEffects;
use crate::events::{DragEventArgs, DragEventKind, GiveFeedbackArgs, QueryContinueDragArgs};

/// The host toolkit a drag runs in.
///
/// The host routes drag events to element handlers (see [`crate::routed`]
/// for a bubbling helper) and answers hit-geometry queries. Elements are
/// identified by small copyable keys; the coordinator never owns elements.
///
/// Dispatch failures are returned as [`DragHost::Error`] and abandon the
/// drag.
pub trait DragHost<D> {
    /// Handle identifying an element.
    type Key: Copy + Eq + Hash + Debug;
    /// Error produced by event dispatch.
    type Error;

    /// Raises a drag event on a drop target.
    ///
    /// Only called for targets that [allow drops](DragHost::allows_drop).
    fn raise_drag_event(
        &mut self,
        kind: DragEventKind,
        target: Self::Key,
        args: &mut DragEventArgs<Self::Key, D>,
    ) -> Result<(), Self::Error>;

    /// Raises the give-feedback event on the drag source.
    fn raise_give_feedback(
        &mut self,
        source: Self::Key,
        args: &mut GiveFeedbackArgs<Self::Key>,
    ) -> Result<(), Self::Error>;

    /// Raises the query-continue-drag event on the drag source.
    fn raise_query_continue_drag(
        &mut self,
        source: Self::Key,
        args: &mut QueryContinueDragArgs<Self::Key>,
    ) -> Result<(), Self::Error>;

    /// Returns `true` if `element` accepts drops.
    fn allows_drop(&self, element: Self::Key) -> bool;

    /// Returns `true` if `point`, in root coordinates, lies within the bounds
    /// of `element`.
    fn contains_point(&self, element: Self::Key, point: Point) -> bool;

    /// Returns the visual children of `element`.
    fn visual_children(&self, element: Self::Key) -> impl Iterator<Item = Self::Key> + '_;

    /// Returns the visual parent of `element`.
    fn parent(&self, element: Self::Key) -> Option<Self::Key>;

    /// Returns the root of the visual tree, if there is one.
    fn root_visual(&self) -> Option<Self::Key>;
}

/// Receives the result of a drag, exactly once.
///
/// Implemented for `FnOnce(DragDropEffects)` closures.
pub trait DragObserver {
    /// Called with the final effect when the drag completes.
    fn on_completed(self: Box<Self>, effects: DragDropEffects);
}

impl<F> DragObserver for F
where
    F: FnOnce(DragDropEffects),
{
    fn on_completed(self: Box<Self>, effects: DragDropEffects) {
        (*self)(effects);
    }
}
