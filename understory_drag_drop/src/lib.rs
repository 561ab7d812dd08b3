// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Drag Drop: drag-and-drop coordination for UI.
//!
//! This crate drives one drag-and-drop gesture at a time, from the first
//! query to the drag source to the final drop effect. It owns the protocol
//! and none of the toolkit: event routing and hit geometry come from a
//! [`DragHost`], and the result goes to a [`DragObserver`].
//!
//! - [`DragCoordinator`]: holds at most one [`DragSession`] and feeds it
//!   pointer, key and timer input.
//! - [`negotiate_effects`]: the effect implied by the modifier keys.
//! - [`routed`]: a bubbling helper for implementing [`DragHost`] dispatch.
//!
//! ## Protocol
//!
//! A drag starts by asking the source whether to proceed
//! (query-continue-drag) and then reporting the current effect to it
//! (give-feedback). While active:
//!
//! - A pointer move over a new element raises `Leave` on the old target,
//!   `Enter` on the new one, then `Over`. Every drag event is followed by
//!   give-feedback and query-continue-drag on the source.
//! - Modifier key and escape changes re-raise give-feedback and
//!   query-continue-drag.
//! - While the pointer rests, [`DragCoordinator::tick`] re-raises `Over`
//!   every [`DragConfig::pulse_interval`]. If the pointer is no longer
//!   inside the element it last moved over, the deepest element under it is
//!   looked up from the root visual.
//!
//! Unless the source answers the query itself, escape cancels the drag, and
//! releasing the left button drops when the last feedback effect was not
//! [`DragDropEffects::NONE`]. A drop raises `Drop` on the target and
//! completes with the effect the target reported. A cancel raises `Leave`
//! and completes with [`DragDropEffects::NONE`].
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect};
//! use understory_drag_drop::{
//!     DragCoordinator, DragDropEffects, DragDropKeyStates, DragEventArgs, DragEventKind,
//!     DragHost, GiveFeedbackArgs, QueryContinueDragArgs,
//! };
//!
//! /// Element 0 is the window, element 1 a drop zone inside it.
//! struct Window;
//!
//! impl DragHost<&'static str> for Window {
//!     type Key = u32;
//!     type Error = ();
//!
//!     fn raise_drag_event(
//!         &mut self,
//!         _kind: DragEventKind,
//!         _target: u32,
//!         args: &mut DragEventArgs<u32, &'static str>,
//!     ) -> Result<(), ()> {
//!         args.effects = DragDropEffects::MOVE;
//!         args.handled = true;
//!         Ok(())
//!     }
//!     fn raise_give_feedback(&mut self, _: u32, _: &mut GiveFeedbackArgs<u32>) -> Result<(), ()> {
//!         Ok(())
//!     }
//!     fn raise_query_continue_drag(
//!         &mut self,
//!         _: u32,
//!         _: &mut QueryContinueDragArgs<u32>,
//!     ) -> Result<(), ()> {
//!         Ok(())
//!     }
//!     fn allows_drop(&self, element: u32) -> bool { element == 1 }
//!     fn contains_point(&self, element: u32, point: Point) -> bool {
//!         let bounds = if element == 0 { Rect::new(0., 0., 200., 200.) } else { Rect::new(50., 50., 100., 100.) };
//!         bounds.contains(point)
//!     }
//!     fn visual_children(&self, element: u32) -> impl Iterator<Item = u32> + '_ {
//!         (element == 0).then_some(1).into_iter()
//!     }
//!     fn parent(&self, element: u32) -> Option<u32> { (element == 1).then_some(0) }
//!     fn root_visual(&self) -> Option<u32> { Some(0) }
//! }
//!
//! let result = Rc::new(Cell::new(None));
//! let sink = Rc::clone(&result);
//!
//! let mut host = Window;
//! let mut drags = DragCoordinator::default();
//! drags
//!     .start(
//!         &mut host,
//!         0,
//!         "payload",
//!         DragDropEffects::COPY | DragDropEffects::MOVE,
//!         DragDropKeyStates::LEFT_MOUSE_BUTTON,
//!         move |effects| sink.set(Some(effects)),
//!     )
//!     .unwrap();
//!
//! drags.pointer_moved(&mut host, 1, Point::new(60., 60.), 0).unwrap();
//! assert_eq!(drags.session().unwrap().current_target(), Some(1));
//!
//! // Releasing the button drops on the zone.
//! let done = drags.key_states_changed(&mut host, DragDropKeyStates::empty()).unwrap();
//! assert_eq!(done, Some(DragDropEffects::MOVE));
//! assert_eq!(result.get(), Some(DragDropEffects::MOVE));
//! assert!(!drags.is_active());
//! ```
//!
//! ## Diagnostics
//!
//! With the `tracing` feature enabled, phase transitions, target changes
//! and results are reported through `tracing`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Kurbo needs either the `std`
//! (default) or the `libm` feature.

#![no_std]

extern crate alloc;

mod coordinator;
mod effects;
mod error;
mod events;
mod host;
mod log;
pub mod routed;
mod session;

pub use coordinator::{DragConfig, DragCoordinator};
pub use effects::{DragDropEffects, DragDropKeyStates, negotiate_effects};
pub use error::DragError;
pub use events::{
    DragAction, DragEventArgs, DragEventKind, GiveFeedbackArgs, QueryContinueDragArgs,
};
pub use host::{DragHost, DragObserver};
pub use session::{DragPhase, DragSession, SessionId};
