// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag coordinator: at most one drag session at a time.
//!
//! ## Usage
//!
//! 1) Call [`DragCoordinator::start`] when a drag gesture begins, handing it
//!    the observer that receives the final effect.
//! 2) Forward pointer moves, key state changes and escape changes while
//!    [`DragCoordinator::is_active`] holds.
//! 3) Call [`DragCoordinator::tick`] from a timer so drag-over is re-raised
//!    while the pointer rests.
//!
//! Each call returns `Ok(Some(effects))` when it completed the drag. The
//! observer has been called by then and the coordinator is free for the next
//! drag. Events arriving while no drag is active are ignored.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;
use core::time::Duration;

use kurbo::Point;

use crate::effects::{DragDropEffects, DragDropKeyStates};
use crate::error::DragError;
use crate::host::{DragHost, DragObserver};
use crate::log;
use crate::session::{DragPhase, DragSession, SessionId};

/// Configuration for a [`DragCoordinator`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragConfig {
    /// How long the pointer may rest before drag-over is re-raised.
    pub pulse_interval: Duration,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pulse_interval: Duration::from_millis(250),
        }
    }
}

impl DragConfig {
    /// Sets [`DragConfig::pulse_interval`].
    #[must_use]
    pub const fn with_pulse_interval(mut self, interval: Duration) -> Self {
        self.pulse_interval = interval;
        self
    }

    fn pulse_interval_ms(&self) -> u64 {
        u64::try_from(self.pulse_interval.as_millis()).unwrap_or(u64::MAX)
    }
}

struct ActiveDrag<K, D> {
    session: DragSession<K, D>,
    observer: Box<dyn DragObserver>,
}

/// Runs drag-and-drop gestures, one at a time.
///
/// Timestamps are milliseconds on any monotonic clock the host chooses.
pub struct DragCoordinator<K, D> {
    config: DragConfig,
    next_id: u64,
    active: Option<ActiveDrag<K, D>>,
}

impl<K: fmt::Debug, D> fmt::Debug for DragCoordinator<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragCoordinator")
            .field("config", &self.config)
            .field("next_id", &self.next_id)
            .field(
                "active",
                &self.active.as_ref().map(|active| active.session.id()),
            )
            .finish()
    }
}

impl<K, D> Default for DragCoordinator<K, D> {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl<K, D> DragCoordinator<K, D> {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            next_id: 1,
            active: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> DragConfig {
        self.config
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession<K, D>> {
        self.active.as_ref().map(|active| &active.session)
    }
}

impl<K, D> DragCoordinator<K, D>
where
    K: Copy + Eq + fmt::Debug,
{
    /// Returns the phase of the active session, if any.
    #[must_use]
    pub fn phase(&self) -> Option<DragPhase> {
        self.session().map(DragSession::phase)
    }

    /// Starts a drag of `data` from `source`.
    ///
    /// The source is asked right away whether to proceed, so the drag may
    /// already be over when this returns; the observer has then been called.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::AlreadyActive`] if a drag is in progress (no
    /// state changes), or [`DragError::Host`] if raising an event failed.
    pub fn start<H>(
        &mut self,
        host: &mut H,
        source: K,
        data: D,
        allowed: DragDropEffects,
        initial_keys: DragDropKeyStates,
        observer: impl DragObserver + 'static,
    ) -> Result<SessionId, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        if self.active.is_some() {
            log::warn!(?source, "drag requested while another is in progress");
            return Err(DragError::AlreadyActive);
        }
        let id = SessionId(self.next_id);
        self.next_id += 1;
        log::debug!(session = id.0, ?source, ?allowed, "drag started");

        let session = DragSession::new(id, source, Rc::new(data), allowed, initial_keys);
        self.active = Some(ActiveDrag {
            session,
            observer: Box::new(observer),
        });
        self.drive(|session| session.begin(host))?;
        Ok(id)
    }

    /// Handles the pointer moving over `element` at `position`, in root
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::Host`] if raising an event failed.
    pub fn pointer_moved<H>(
        &mut self,
        host: &mut H,
        element: K,
        position: Point,
        now: u64,
    ) -> Result<Option<DragDropEffects>, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        let interval = self.config.pulse_interval_ms();
        self.drive(|session| session.pointer_moved(host, element, position, now, interval))
    }

    /// Handles a change of mouse button or modifier key state.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::Host`] if raising an event failed.
    pub fn key_states_changed<H>(
        &mut self,
        host: &mut H,
        keys: DragDropKeyStates,
    ) -> Result<Option<DragDropEffects>, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        self.drive(|session| session.key_states_changed(host, keys))
    }

    /// Handles escape being pressed or released.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::Host`] if raising an event failed.
    pub fn escape_changed<H>(
        &mut self,
        host: &mut H,
        pressed: bool,
    ) -> Result<Option<DragDropEffects>, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        self.drive(|session| session.escape_changed(host, pressed))
    }

    /// Re-raises drag-over on the last pointer position when the pointer has
    /// rested for [`DragConfig::pulse_interval`].
    ///
    /// # Errors
    ///
    /// Returns [`DragError::Host`] if raising an event failed.
    pub fn tick<H>(
        &mut self,
        host: &mut H,
        now: u64,
    ) -> Result<Option<DragDropEffects>, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        let interval = self.config.pulse_interval_ms();
        self.drive(|session| session.pulse(host, now, interval))
    }

    /// Abandons the active drag.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NoActiveSession`] when no drag is in progress, or
    /// [`DragError::Host`] if raising an event failed.
    pub fn cancel<H>(&mut self, host: &mut H) -> Result<DragDropEffects, DragError<H::Error>>
    where
        H: DragHost<D, Key = K>,
    {
        if self.active.is_none() {
            return Err(DragError::NoActiveSession);
        }
        let effects = self.drive(|session| session.cancel(host).map(Some))?;
        Ok(effects.unwrap_or(DragDropEffects::NONE))
    }

    /// Runs one step on the active session, then delivers the result or
    /// abandons the session as the step demands.
    fn drive<E>(
        &mut self,
        step: impl FnOnce(&mut DragSession<K, D>) -> Result<Option<DragDropEffects>, E>,
    ) -> Result<Option<DragDropEffects>, DragError<E>> {
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        match step(&mut active.session) {
            Ok(None) => Ok(None),
            Ok(Some(effects)) => {
                if let Some(finished) = self.active.take() {
                    log::debug!(session = finished.session.id().0, ?effects, "drag completed");
                    finished.observer.on_completed(effects);
                }
                Ok(Some(effects))
            }
            Err(err) => {
                self.active = None;
                log::warn!("drag abandoned after host error");
                Err(DragError::Host(err))
            }
        }
    }
}
