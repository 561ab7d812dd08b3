// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop effects, drag key states and effect negotiation.

bitflags::bitflags! {
    /// The operations a drop can perform.
    ///
    /// Bit values match the platform drag-and-drop effect flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DragDropEffects: u32 {
        /// The data is copied to the drop target.
        const COPY = 0b0000_0001;
        /// The data is moved to the drop target.
        const MOVE = 0b0000_0010;
        /// The drop target links to the data.
        const LINK = 0b0000_0100;
        /// Copy, move and link.
        const ALL = Self::COPY.bits() | Self::MOVE.bits() | Self::LINK.bits();
    }
}

impl DragDropEffects {
    /// The drop target does not accept the data.
    pub const NONE: Self = Self::empty();
}

impl Default for DragDropEffects {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags::bitflags! {
    /// Mouse button and modifier key state during a drag.
    ///
    /// Bit values match the platform drag-and-drop key state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DragDropKeyStates: u8 {
        /// The left mouse button is held.
        const LEFT_MOUSE_BUTTON = 0b0000_0001;
        /// The right mouse button is held.
        const RIGHT_MOUSE_BUTTON = 0b0000_0010;
        /// A shift key is held.
        const SHIFT_KEY = 0b0000_0100;
        /// A control key is held.
        const CONTROL_KEY = 0b0000_1000;
        /// The middle mouse button is held.
        const MIDDLE_MOUSE_BUTTON = 0b0001_0000;
        /// An alt key is held.
        const ALT_KEY = 0b0010_0000;
    }
}

impl Default for DragDropKeyStates {
    fn default() -> Self {
        Self::empty()
    }
}

/// Picks the effect implied by the modifier keys, given the allowed effects.
///
/// Control with shift asks for a link, control alone asks for a copy. A
/// request for an effect that is not allowed yields [`DragDropEffects::NONE`].
/// Without control, a move is preferred when allowed; otherwise the allowed
/// set is returned unchanged.
///
/// ```rust
/// use understory_drag_drop::{DragDropEffects as E, DragDropKeyStates as K, negotiate_effects};
///
/// assert_eq!(negotiate_effects(E::ALL, K::CONTROL_KEY | K::SHIFT_KEY), E::LINK);
/// assert_eq!(negotiate_effects(E::COPY | E::MOVE, K::CONTROL_KEY), E::COPY);
/// assert_eq!(negotiate_effects(E::MOVE, K::empty()), E::MOVE);
/// assert_eq!(negotiate_effects(E::COPY, K::empty()), E::COPY);
/// ```
#[must_use]
pub fn negotiate_effects(allowed: DragDropEffects, keys: DragDropKeyStates) -> DragDropEffects {
    let wanted = if keys.contains(DragDropKeyStates::CONTROL_KEY) {
        if keys.contains(DragDropKeyStates::SHIFT_KEY) {
            DragDropEffects::LINK
        } else {
            DragDropEffects::COPY
        }
    } else if allowed.contains(DragDropEffects::MOVE) {
        return DragDropEffects::MOVE;
    } else {
        return allowed;
    };
    if allowed.contains(wanted) {
        wanted
    } else {
        DragDropEffects::NONE
    }
}
