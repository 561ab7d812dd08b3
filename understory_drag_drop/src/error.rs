// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Error returned by [`DragCoordinator`](crate::DragCoordinator) operations.
#[derive(Clone, PartialEq, Eq)]
pub enum DragError<E> {
    /// A drag session is already in progress.
    AlreadyActive,
    /// There is no drag session to act on.
    NoActiveSession,
    /// The host failed while raising a drag event.
    ///
    /// The session is abandoned: its observer is dropped without being
    /// called, and the coordinator is idle again, so the next
    /// [`start`](crate::DragCoordinator::start) succeeds.
    Host(E),
}

impl<E: fmt::Debug> fmt::Debug for DragError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("DragError::AlreadyActive"),
            Self::NoActiveSession => f.write_str("DragError::NoActiveSession"),
            Self::Host(err) => write!(f, "DragError::Host({err:?})"),
        }
    }
}

impl<E: fmt::Display> fmt::Display for DragError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("a drag operation is already in progress"),
            Self::NoActiveSession => f.write_str("no drag operation is in progress"),
            Self::Host(err) => write!(f, "drag event dispatch failed: {err}"),
        }
    }
}

impl<E> core::error::Error for DragError<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            Self::AlreadyActive | Self::NoActiveSession => None,
        }
    }
}
