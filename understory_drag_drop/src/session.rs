// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-drag protocol state machine.
//!
//! Every step returns `Ok(Some(effects))` when it completed the drag, and
//! `Ok(None)` while the drag goes on. The coordinator owns delivery of the
//! result and clearing of the active slot.

use alloc::collections::VecDeque;
use alloc::rc::Rc;

use kurbo::Point;

use crate::effects::{DragDropEffects, DragDropKeyStates, negotiate_effects};
use crate::events::{
    DragAction, DragEventArgs, DragEventKind, GiveFeedbackArgs, QueryContinueDragArgs,
};
use crate::host::DragHost;
use crate::log;

/// Identifies one drag session of a [`DragCoordinator`](crate::DragCoordinator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// Returns the raw id. Ids increase with every started session.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Where a drag session is in its protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragPhase {
    /// The source is being asked whether to proceed.
    Starting,
    /// Pointer, key and pulse events drive the drag.
    Active,
    /// The data is being dropped on the current target.
    Dropping,
    /// The drag is being abandoned.
    Cancelling,
    /// The drag finished with the given effect.
    Completed(DragDropEffects),
}

/// State of one drag-and-drop gesture.
#[derive(Debug)]
pub struct DragSession<K, D> {
    id: SessionId,
    source: K,
    allowed: DragDropEffects,
    key_states: DragDropKeyStates,
    escape_pressed: bool,
    phase: DragPhase,
    /// Element the pointer was last over, by handle only.
    current_target: Option<K>,
    /// Template for events raised from pointer moves and pulses.
    start_args: DragEventArgs<K, D>,
    /// Payload of the most recent routed drag event.
    last_drag: DragEventArgs<K, D>,
    last_feedback: Option<DragDropEffects>,
    /// Element and position of the most recent pointer move.
    last_move: Option<(K, Point)>,
    next_pulse_at: Option<u64>,
}

impl<K, D> DragSession<K, D> {
    /// Returns the session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the dragged data.
    #[must_use]
    pub fn data(&self) -> &D {
        &self.start_args.data
    }

    /// Returns the effects the source allows.
    #[must_use]
    pub fn allowed_effects(&self) -> DragDropEffects {
        self.allowed
    }

    /// Returns the current button and modifier state.
    #[must_use]
    pub fn key_states(&self) -> DragDropKeyStates {
        self.key_states
    }

    /// Returns whether escape is held.
    #[must_use]
    pub fn escape_pressed(&self) -> bool {
        self.escape_pressed
    }

    /// Returns the protocol phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Returns the effect reported by the last give-feedback event.
    #[must_use]
    pub fn last_feedback(&self) -> Option<DragDropEffects> {
        self.last_feedback
    }

    /// Returns the payload of the most recent routed drag event.
    #[must_use]
    pub fn last_drag_event(&self) -> &DragEventArgs<K, D> {
        &self.last_drag
    }
}

impl<K: Copy, D> DragSession<K, D> {
    /// Returns the drag source.
    #[must_use]
    pub fn source(&self) -> K {
        self.source
    }

    /// Returns the element the pointer is over, once it has moved.
    #[must_use]
    pub fn current_target(&self) -> Option<K> {
        self.current_target
    }
}

impl<K, D> DragSession<K, D>
where
    K: Copy + Eq + core::fmt::Debug,
{
    pub(crate) fn new(
        id: SessionId,
        source: K,
        data: Rc<D>,
        allowed: DragDropEffects,
        initial_keys: DragDropKeyStates,
    ) -> Self {
        let start_args = DragEventArgs {
            original_source: source,
            data,
            allowed_effects: allowed,
            effects: allowed,
            key_states: initial_keys,
            position: None,
            handled: false,
        };
        Self {
            id,
            source,
            allowed,
            key_states: initial_keys,
            escape_pressed: false,
            phase: DragPhase::Starting,
            current_target: None,
            last_drag: start_args.clone(),
            start_args,
            last_feedback: None,
            last_move: None,
            next_pulse_at: None,
        }
    }

    /// Runs the starting step: query the source, then give feedback.
    pub(crate) fn begin<H>(&mut self, host: &mut H) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let query = self.query_continue(host)?;
        if query.handled && query.action == DragAction::Cancel {
            return self.cancel(host).map(Some);
        }
        let last = self.last_drag.clone();
        self.give_feedback(host, &last)?;
        if query.handled && query.action == DragAction::Drop {
            return self.drop_on_target(host).map(Some);
        }
        self.set_phase(DragPhase::Active);
        Ok(None)
    }

    pub(crate) fn pointer_moved<H>(
        &mut self,
        host: &mut H,
        element: K,
        position: Point,
        now: u64,
        pulse_interval: u64,
    ) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        self.last_move = Some((element, position));
        self.next_pulse_at = Some(now.saturating_add(pulse_interval));
        self.drag_over(host, element, position)
    }

    /// Re-raises drag-over on the last pointer position once a pulse is due.
    pub(crate) fn pulse<H>(
        &mut self,
        host: &mut H,
        now: u64,
        pulse_interval: u64,
    ) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let (Some((element, position)), Some(due)) = (self.last_move, self.next_pulse_at) else {
            return Ok(None);
        };
        if now < due {
            return Ok(None);
        }
        self.next_pulse_at = Some(now.saturating_add(pulse_interval));
        let target = if host.contains_point(element, position) {
            Some(element)
        } else {
            recover_source::<D, H>(&*host, element, position)
        };
        let Some(target) = target else {
            log::trace!(?element, "no element under the pointer; pulse skipped");
            return Ok(None);
        };
        self.drag_over(host, target, position)
    }

    pub(crate) fn key_states_changed<H>(
        &mut self,
        host: &mut H,
        keys: DragDropKeyStates,
    ) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        self.key_states = keys;
        self.raise_source_events(host)
    }

    pub(crate) fn escape_changed<H>(
        &mut self,
        host: &mut H,
        pressed: bool,
    ) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        self.escape_pressed = pressed;
        self.raise_source_events(host)
    }

    /// Leaves the current target and completes with no effect.
    pub(crate) fn cancel<H>(&mut self, host: &mut H) -> Result<DragDropEffects, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        self.set_phase(DragPhase::Cancelling);
        self.drag_leave(host)?;
        self.current_target = None;
        Ok(self.complete(DragDropEffects::NONE))
    }

    /// Drops on the target of the last drag event.
    fn drop_on_target<H>(&mut self, host: &mut H) -> Result<DragDropEffects, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        self.set_phase(DragPhase::Dropping);
        let target = self.last_drag.original_source;
        if !host.allows_drop(target) {
            return Ok(self.complete(DragDropEffects::NONE));
        }
        let last = self.last_drag.clone();
        let args = self.raise_routed(host, DragEventKind::Drop, target, last)?;
        // The target's effect stands whether or not it handled the drop.
        Ok(self.complete(args.effects))
    }

    fn complete(&mut self, effects: DragDropEffects) -> DragDropEffects {
        self.set_phase(DragPhase::Completed(effects));
        effects
    }

    fn set_phase(&mut self, phase: DragPhase) {
        log::trace!(session = self.id.0, from = ?self.phase, to = ?phase, "drag phase");
        self.phase = phase;
    }

    /// One drag-over cycle on `target`, entering it first if it is new.
    fn drag_over<H>(
        &mut self,
        host: &mut H,
        target: K,
        position: Point,
    ) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let mut args = self.start_args.clone();
        args.original_source = target;
        args.position = Some(position);
        args.key_states = self.key_states;

        if self.current_target != Some(target) {
            self.drag_leave(host)?;
            log::debug!(?target, "drag target changed");
            self.current_target = Some(target);
            self.raise_routed(host, DragEventKind::Enter, target, args.clone())?;
            if let Some(done) = self.raise_source_events(host)? {
                return Ok(Some(done));
            }
        }
        self.raise_routed(host, DragEventKind::Over, target, args)?;
        self.raise_source_events(host)
    }

    fn drag_leave<H>(&mut self, host: &mut H) -> Result<(), H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        if let Some(previous) = self.current_target {
            let mut args = self.last_drag.clone();
            args.original_source = previous;
            self.raise_routed(host, DragEventKind::Leave, previous, args)?;
        }
        Ok(())
    }

    /// Raises a drag event on `element`, recording it as the last drag event.
    ///
    /// Elements that do not accept drops are not dispatched to; the event
    /// reports no effect and counts as handled.
    fn raise_routed<H>(
        &mut self,
        host: &mut H,
        kind: DragEventKind,
        element: K,
        mut args: DragEventArgs<K, D>,
    ) -> Result<DragEventArgs<K, D>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        args.effects = args.allowed_effects;
        args.original_source = element;
        args.handled = false;
        if host.allows_drop(element) {
            host.raise_drag_event(kind, element, &mut args)?;
        } else {
            args.effects = DragDropEffects::NONE;
            args.handled = true;
        }
        self.last_drag = args.clone();
        Ok(args)
    }

    fn raise_source_events<H>(&mut self, host: &mut H) -> Result<Option<DragDropEffects>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let last = self.last_drag.clone();
        self.give_feedback(host, &last)?;
        let query = self.query_continue(host)?;
        if !query.handled {
            return Ok(None);
        }
        match query.action {
            DragAction::Continue => Ok(None),
            DragAction::Drop => self.drop_on_target(host).map(Some),
            DragAction::Cancel => self.cancel(host).map(Some),
        }
    }

    fn give_feedback<H>(&mut self, host: &mut H, drag: &DragEventArgs<K, D>) -> Result<(), H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let effects = if drag.handled {
            self.allowed & drag.effects
        } else {
            negotiate_effects(self.allowed, self.key_states)
        };
        let mut args = GiveFeedbackArgs {
            original_source: self.source,
            effects,
            handled: false,
        };
        self.last_feedback = Some(effects);
        host.raise_give_feedback(self.source, &mut args)
    }

    /// Asks the source how to proceed, filling in the default answer when
    /// it leaves the query unhandled.
    fn query_continue<H>(&mut self, host: &mut H) -> Result<QueryContinueDragArgs<K>, H::Error>
    where
        H: DragHost<D, Key = K>,
    {
        let mut args = QueryContinueDragArgs {
            original_source: self.source,
            action: DragAction::Continue,
            escape_pressed: self.escape_pressed,
            key_states: self.key_states,
            handled: false,
        };
        host.raise_query_continue_drag(self.source, &mut args)?;
        if !args.handled {
            if args.escape_pressed {
                args.action = DragAction::Cancel;
                args.handled = true;
            } else if !args
                .key_states
                .contains(DragDropKeyStates::LEFT_MOUSE_BUTTON)
            {
                let accepted = self
                    .last_feedback
                    .is_none_or(|effects| effects != DragDropEffects::NONE);
                args.action = if accepted {
                    DragAction::Drop
                } else {
                    DragAction::Cancel
                };
                args.handled = true;
            }
        }
        Ok(args)
    }
}

/// Finds the deepest element under `position` when the pointer has left
/// `element`.
///
/// Elements without a parent are kept as they are. Otherwise the visual tree
/// is searched breadth-first from the root, descending only into elements
/// that contain the point, and the last one found wins.
fn recover_source<D, H>(host: &H, element: H::Key, position: Point) -> Option<H::Key>
where
    H: DragHost<D>,
{
    if host.parent(element).is_none() {
        return Some(element);
    }
    let Some(root) = host.root_visual() else {
        return Some(element);
    };
    let mut found = None;
    let mut queue = VecDeque::new();
    if host.contains_point(root, position) {
        queue.push_back(root);
    }
    while let Some(node) = queue.pop_front() {
        found = Some(node);
        queue.extend(
            host.visual_children(node)
                .filter(|&child| host.contains_point(child, position)),
        );
    }
    log::debug!(stale = ?element, recovered = ?found, "recovered drag-over source");
    found
}
