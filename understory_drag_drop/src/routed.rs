// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubbling helper for implementing [`DragHost`](crate::DragHost) dispatch.
//!
//! Drag events bubble: handlers run on the target, then on each ancestor up
//! to the root, until one marks the event handled.
//!
//! ## Minimal example
//!
//! ```
//! use understory_drag_drop::routed::{bubble_path, raise_bubbling};
//! use understory_drag_drop::{DragDropEffects, GiveFeedbackArgs};
//!
//! // 3 is a child of 2, which is a child of 1.
//! let parent = |k: u32| (k > 1).then(|| k - 1);
//! let path = bubble_path(3, parent);
//! assert_eq!(path, [3, 2, 1]);
//!
//! let mut args = GiveFeedbackArgs { original_source: 3, effects: DragDropEffects::MOVE, handled: false };
//! let mut seen = Vec::new();
//! let handled = raise_bubbling(&path, &mut args, |node, args| {
//!     seen.push(node);
//!     args.handled = node == 2;
//!     Ok::<(), ()>(())
//! })
//! .unwrap();
//!
//! assert!(handled);
//! assert_eq!(seen, [3, 2]);
//! ```

use alloc::vec::Vec;

use crate::events::{DragEventArgs, GiveFeedbackArgs, QueryContinueDragArgs};

/// Event payloads that carry a handled flag.
pub trait RoutedArgs {
    /// Returns `true` once a handler has marked the event handled.
    fn is_handled(&self) -> bool;
}

impl<K, D> RoutedArgs for DragEventArgs<K, D> {
    fn is_handled(&self) -> bool {
        self.handled
    }
}

impl<K> RoutedArgs for GiveFeedbackArgs<K> {
    fn is_handled(&self) -> bool {
        self.handled
    }
}

impl<K> RoutedArgs for QueryContinueDragArgs<K> {
    fn is_handled(&self) -> bool {
        self.handled
    }
}

/// Returns the bubbling route from `target` up to its root, target first.
pub fn bubble_path<K: Copy>(target: K, mut parent: impl FnMut(K) -> Option<K>) -> Vec<K> {
    let mut path = Vec::new();
    let mut cursor = Some(target);
    while let Some(node) = cursor {
        path.push(node);
        cursor = parent(node);
    }
    path
}

/// Runs `handler` for each entry of `path` in order, stopping once the event
/// is handled.
///
/// Returns whether the event was handled. A handler error aborts the route
/// and is returned as is.
pub fn raise_bubbling<K, A, E>(
    path: &[K],
    args: &mut A,
    mut handler: impl FnMut(K, &mut A) -> Result<(), E>,
) -> Result<bool, E>
where
    K: Copy,
    A: RoutedArgs,
{
    for &node in path {
        handler(node, args)?;
        if args.is_handled() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{DragDropEffects, DragDropKeyStates};
    use crate::events::DragAction;
    use alloc::vec;

    fn query(source: u32) -> QueryContinueDragArgs<u32> {
        QueryContinueDragArgs {
            original_source: source,
            action: DragAction::Continue,
            escape_pressed: false,
            key_states: DragDropKeyStates::LEFT_MOUSE_BUTTON,
            handled: false,
        }
    }

    #[test]
    fn path_of_root_is_itself() {
        assert_eq!(bubble_path(7_u32, |_| None), vec![7]);
    }

    #[test]
    fn unhandled_event_visits_whole_path() {
        let mut args = query(3);
        let mut seen = Vec::new();
        let handled = raise_bubbling(&[3, 2, 1], &mut args, |node, _| {
            seen.push(node);
            Ok::<(), ()>(())
        });
        assert_eq!(handled, Ok(false));
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn handler_error_aborts_route() {
        let mut args = GiveFeedbackArgs {
            original_source: 3_u32,
            effects: DragDropEffects::COPY,
            handled: false,
        };
        let mut seen = Vec::new();
        let result = raise_bubbling(&[3, 2, 1], &mut args, |node, _| {
            seen.push(node);
            if node == 2 { Err("boom") } else { Ok(()) }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(seen, vec![3, 2]);
    }

    #[test]
    fn handled_before_dispatch_still_runs_target() {
        let mut args = query(3);
        args.handled = true;
        let mut seen = Vec::new();
        let handled = raise_bubbling(&[3, 2], &mut args, |node, _| {
            seen.push(node);
            Ok::<(), ()>(())
        });
        assert_eq!(handled, Ok(true));
        assert_eq!(seen, vec![3]);
    }
}
